//! 비밀번호 정책 및 해싱.
//!
//! 복잡도 검증은 하나의 원자적 조건으로 수행되며, 해싱은 Argon2id를 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};

/// 비밀번호에 허용되는 특수문자 집합.
pub const ALLOWED_SYMBOLS: &str = "@$!%*?&#";

/// 최소 비밀번호 길이.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// 복잡도 요구사항 위반.
///
/// 거부된 값은 진단용으로 보관되지만 `Debug`/`Display` 출력에는 나타나지 않습니다.
#[derive(Debug, thiserror::Error)]
#[error("비밀번호가 요구되는 형식과 일치하지 않습니다")]
pub struct PolicyError {
    rejected: SecretString,
}

impl PolicyError {
    fn new(raw: &str) -> Self {
        Self {
            rejected: SecretString::from(raw),
        }
    }

    /// 거부된 원본 값.
    pub fn rejected_value(&self) -> &str {
        self.rejected.expose_secret()
    }
}

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 비밀번호 복잡도 검증.
///
/// 다음을 모두 만족해야 합니다:
/// - 소문자, 대문자, 숫자 각 1개 이상
/// - [`ALLOWED_SYMBOLS`] 중 특수문자 1개 이상
/// - 최소 [`MIN_PASSWORD_LENGTH`]자
/// - 위 문자 집합 밖의 문자 없음
///
/// 어떤 조건이 실패했는지는 알려주지 않습니다.
pub fn validate_complexity(raw: &str) -> Result<(), PolicyError> {
    if satisfies_policy(raw) {
        Ok(())
    } else {
        Err(PolicyError::new(raw))
    }
}

fn satisfies_policy(raw: &str) -> bool {
    let (mut lower, mut upper, mut digit, mut symbol) = (false, false, false, false);
    let mut length = 0usize;

    for c in raw.chars() {
        length += 1;
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if ALLOWED_SYMBOLS.contains(c) => symbol = true,
            _ => return false,
        }
    }

    lower && upper && digit && symbol && length >= MIN_PASSWORD_LENGTH
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘과 무작위 솔트를 사용하며 PHC 형식 문자열을 반환합니다.
/// 복잡도 검증은 하지 않습니다. 저장 전에는 [`validate_complexity`]를 거쳐야 합니다.
///
/// ```rust,ignore
/// let hash = hash_password("Str0ng!Pass")?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(raw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 복잡도 검증 후 해싱.
///
/// 저장할 해시를 만드는 유일한 경로입니다.
pub fn hash_with_policy(raw: &str) -> Result<String, PasswordError> {
    validate_complexity(raw)?;
    hash_password(raw)
}

/// 비밀번호 검증.
///
/// Argon2의 검증 루틴으로 비교합니다. 저장된 해시를 파싱할 수 없으면 `false`.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
