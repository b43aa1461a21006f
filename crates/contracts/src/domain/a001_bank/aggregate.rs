use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор банка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankId(pub Uuid);

impl BankId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for BankId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(BankId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Банк (наименование хранится в `base.description`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    #[serde(flatten)]
    pub base: BaseAggregate<BankId>,

    pub address: String,

    #[serde(rename = "accountNumber")]
    pub account_number: String,

    pub swift: String,
}

impl Bank {
    /// Создать новый банк для вставки в БД
    pub fn new_for_insert(
        code: String,
        name: String,
        address: String,
        account_number: String,
        swift: String,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(BankId::new_v4(), code, name);
        base.comment = comment;

        Self {
            base,
            address,
            account_number,
            swift,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &BankDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.name.clone();
        self.base.comment = dto.comment.clone();
        self.address = dto.address.clone();
        self.account_number = dto.account_number.clone();
        self.swift = dto.swift.clone();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Bank name must not be empty".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Code must not be empty".into());
        }

        // SWIFT/BIC: 8 или 11 символов, пустой допускается
        let swift = self.swift.trim();
        if !swift.is_empty() {
            let len = swift.chars().count();
            if (len != 8 && len != 11) || !swift.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err("SWIFT code must be 8 or 11 alphanumeric characters".into());
            }
        }

        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Bank {
    type Id = BankId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "bank"
    }

    fn element_name() -> &'static str {
        "Bank"
    }

    fn list_name() -> &'static str {
        "Banks"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления банка
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BankDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub address: String,

    #[serde(rename = "accountNumber")]
    pub account_number: String,

    pub swift: String,
    pub comment: Option<String>,
}

impl From<&Bank> for BankDto {
    fn from(bank: &Bank) -> Self {
        Self {
            id: Some(bank.to_string_id()),
            code: Some(bank.base.code.clone()),
            name: bank.base.description.clone(),
            address: bank.address.clone(),
            account_number: bank.account_number.clone(),
            swift: bank.swift.clone(),
            comment: bank.base.comment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bank {
        Bank::new_for_insert(
            "BNK-001".into(),
            "First National".into(),
            "1 Main St".into(),
            "40702810000000000001".into(),
            "DEUTDEFF".into(),
            None,
        )
    }

    #[test]
    fn test_valid_bank_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut bank = sample();
        bank.base.description = "   ".into();
        assert!(bank.validate().is_err());
    }

    #[test]
    fn test_swift_length_is_checked() {
        let mut bank = sample();
        bank.swift = "DEUTDEFF500".into();
        assert!(bank.validate().is_ok());
        bank.swift = "DEUT".into();
        assert!(bank.validate().is_err());
        bank.swift = String::new();
        assert!(bank.validate().is_ok());
    }

    #[test]
    fn test_update_keeps_code_when_dto_code_is_blank() {
        let mut bank = sample();
        let mut dto = BankDto::from(&bank);
        dto.code = Some(String::new());
        dto.name = "Renamed".into();
        bank.update(&dto);
        assert_eq!(bank.base.code, "BNK-001");
        assert_eq!(bank.base.description, "Renamed");
    }

    #[test]
    fn test_custom_fields_entity_tag() {
        assert_eq!(Bank::custom_fields_entity(), "bank");
        assert_eq!(Bank::full_name(), "a001_bank");
    }
}
