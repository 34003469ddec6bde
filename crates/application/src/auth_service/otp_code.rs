use super::*;

/// Number of digits in a one-time code.
const OTP_DIGITS: usize = 6;

/// One-time code generator backed by the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> AppResult<String> {
        let mut bytes = [0u8; 4];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate verification code: {error}"))
        })?;

        let value = u32::from_le_bytes(bytes) % 1_000_000;
        Ok(format!("{value:0width$}", width = OTP_DIGITS))
    }
}

/// What a stored one-time code unlocks. Part of the digest, so a code
/// issued for one purpose never verifies for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CodePurpose {
    /// Mobile login via SMS.
    Login,
    /// Confirmation of the contact email.
    Email,
}

impl CodePurpose {
    fn tag(self) -> &'static [u8] {
        match self {
            Self::Login => b"login:",
            Self::Email => b"email:",
        }
    }
}

/// Computes the SHA-256 digest of a one-time code for storage.
pub(super) fn hash_code(purpose: CodePurpose, code: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(purpose.tag());
    hasher.update(code.trim().as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() -> AppResult<()> {
        let generator = RandomOtpGenerator;
        for _ in 0..50 {
            let code = generator.generate()?;
            assert_eq!(code.len(), OTP_DIGITS);
            assert!(code.chars().all(|character| character.is_ascii_digit()));
        }
        Ok(())
    }

    #[test]
    fn code_hash_ignores_surrounding_whitespace() {
        let login = CodePurpose::Login;
        assert_eq!(hash_code(login, " 123456 "), hash_code(login, "123456"));
        assert_ne!(hash_code(login, "123456"), hash_code(login, "123457"));
        assert_eq!(hash_code(login, "000000").len(), 64);
    }

    #[test]
    fn code_hash_depends_on_purpose() {
        assert_ne!(
            hash_code(CodePurpose::Login, "123456"),
            hash_code(CodePurpose::Email, "123456")
        );
    }
}
