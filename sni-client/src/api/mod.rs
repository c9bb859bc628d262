//! Ресурсные операции `SniClient`, по одному модулю на раздел приложения.

pub(crate) mod ai;
pub(crate) mod auth;
pub(crate) mod badges;
pub(crate) mod comments;
pub(crate) mod files;
pub(crate) mod notifications;
pub(crate) mod oauth;
pub(crate) mod posts;
pub(crate) mod problems;
pub(crate) mod snippets;
pub(crate) mod users;

use serde::Serialize;
use validator::ValidationError;

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct PageQuery {
    pub(crate) page: u32,
    pub(crate) size: u32,
}

impl PageQuery {
    pub(crate) fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, 100),
        }
    }
}

/// Строка не должна состоять только из пробельных символов.
pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(non_blank("   ").is_err());
        assert!(non_blank(" \n\t").is_err());
        assert!(non_blank(" x ").is_ok());
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageQuery::new(0, 0).size, 1);
        assert_eq!(PageQuery::new(2, 500).size, 100);
        assert_eq!(PageQuery::new(2, 20).page, 2);
    }
}
