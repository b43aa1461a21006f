use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Жизненный цикл записи: даты, мягкое удаление, номер версии
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Удалённые записи не показываются в списках, строка в БД остаётся
    pub is_deleted: bool,
    /// 0 до первой записи в БД, дальше +1 на каждое сохранение
    pub version: i32,
}

impl EntityMetadata {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            is_deleted: false,
            version: 0,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }

    pub fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Поля, общие для банков и товаров. Наименование хранится в `description`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAggregate<Id> {
    pub id: Id,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub metadata: EntityMetadata,
}

impl<Id> BaseAggregate<Id> {
    pub fn new(id: Id, code: String, description: String) -> Self {
        Self::with_metadata(id, code, description, None, EntityMetadata::new())
    }

    /// Собрать агрегат из строки БД
    pub fn with_metadata(
        id: Id,
        code: String,
        description: String,
        comment: Option<String>,
        metadata: EntityMetadata,
    ) -> Self {
        Self {
            id,
            code,
            description,
            comment,
            metadata,
        }
    }

    pub fn touch(&mut self) {
        self.metadata.touch();
    }
}

/// Код из формы или сгенерированный: `BNK-1A2B3C4D`
pub fn code_or_generated(code: Option<&str>, prefix: &str) -> String {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => code.to_string(),
        None => {
            let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
            format!("{}-{}", prefix, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_or_generated() {
        assert_eq!(code_or_generated(Some(" BNK-7 "), "BNK"), "BNK-7");

        let generated = code_or_generated(Some("  "), "PRD");
        assert!(generated.starts_with("PRD-"));
        assert_eq!(generated.len(), 12);
        assert!(generated[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_aggregate_starts_unsaved() {
        let base = BaseAggregate::new(1u32, "C".into(), "Name".into());
        assert_eq!(base.metadata.version, 0);
        assert!(!base.metadata.is_deleted);
        assert_eq!(base.comment, None);
    }
}
