//! 字段提取 - 业务能力层
//!
//! 只负责"按固定位置把表格映射成命名字段"，不做类型转换。

use crate::error::ExtractionError;
use crate::models::raw_row::{RawRow, MIN_POSITIONS};

/// 表格中各字段的位置
pub mod position {
    pub const PREPARATION: usize = 2;
    pub const PIECES_ONION: usize = 3;
    pub const TRAYS_ONION: usize = 4;
    pub const PIECES_FLAME: usize = 5;
    pub const TRAYS_FLAME: usize = 6;
    pub const SWEET: usize = 7;
    pub const FULFILLMENT: usize = 9;
    pub const DAY: usize = 10;
    pub const TIME_SLOT: usize = 11;
    pub const FIRST_NAME: usize = 13;
    pub const LAST_NAME: usize = 14;
    pub const EMAIL: usize = 15;
    pub const PHONE: usize = 16;
    pub const ADDRESS: usize = 17;
}

/// 提取出的命名字段（仍是原始文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFields {
    pub preparation: String,
    pub pieces_onion: String,
    pub trays_onion: String,
    pub pieces_flame: String,
    pub trays_flame: String,
    pub sweet: String,
    pub fulfillment: String,
    pub day: String,
    pub time_slot: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// 从原始表格提取字段
///
/// 表格少于 18 行时立即失败，不产生部分结果。
pub fn extract_fields(row: &RawRow) -> Result<OrderFields, ExtractionError> {
    if row.len() < MIN_POSITIONS {
        return Err(ExtractionError::TooShort {
            required: MIN_POSITIONS,
            actual: row.len(),
        });
    }

    let get = |position: usize| -> String { row.value(position).unwrap_or_default().to_string() };

    Ok(OrderFields {
        preparation: get(position::PREPARATION),
        pieces_onion: get(position::PIECES_ONION),
        trays_onion: get(position::TRAYS_ONION),
        pieces_flame: get(position::PIECES_FLAME),
        trays_flame: get(position::TRAYS_FLAME),
        sweet: get(position::SWEET),
        fulfillment: get(position::FULFILLMENT),
        day: get(position::DAY),
        time_slot: get(position::TIME_SLOT),
        first_name: get(position::FIRST_NAME),
        last_name: get(position::LAST_NAME),
        email: get(position::EMAIL),
        phone: get(position::PHONE),
        address: get(position::ADDRESS),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::raw_row::RawField;

    /// 构造一张标准订单表格，`overrides` 按位置替换值
    pub(crate) fn sample_row(overrides: &[(usize, &str)]) -> RawRow {
        let mut fields = vec![
            RawField::new("Bestellung", ""),
            RawField::new("Datum", "04.10.2021"),
            RawField::new("Art", "Vorgebacken"),
            RawField::new("Stück Zwiebelkuchen", "3"),
            RawField::new("Blech Zwiebelkuchen", "1"),
            RawField::new("Stück Flammkuchen", "2"),
            RawField::new("Blech Flammkuchen", "0"),
            RawField::new("Neuer Süßer", "keiner"),
            RawField::new("", ""),
            RawField::new("Abholung/Lieferung", "Abholung"),
            RawField::new("Tag", "Samstag, 09.10."),
            RawField::new("Uhrzeit", "17:00"),
            RawField::new("Kontakt", ""),
            RawField::new("Vorname", "Erika"),
            RawField::new("Name", "Mustermann"),
            RawField::new("E-Mail", "erika@example.org"),
            RawField::new("Telefon", "0171 1234567"),
            RawField::new("Adresse", "Hauptstraße 1"),
        ];
        for (position, value) in overrides {
            fields[*position].value = value.to_string();
        }
        RawRow::new(fields)
    }

    #[test]
    fn test_extract_reads_fixed_positions() {
        let fields = extract_fields(&sample_row(&[])).unwrap();
        assert_eq!(fields.preparation, "Vorgebacken");
        assert_eq!(fields.pieces_onion, "3");
        assert_eq!(fields.trays_flame, "0");
        assert_eq!(fields.time_slot, "17:00");
        assert_eq!(fields.phone, "0171 1234567");
        assert_eq!(fields.address, "Hauptstraße 1");
    }

    #[test]
    fn test_extract_ignores_labels() {
        let mut row = sample_row(&[]);
        let mut fields = row.fields().to_vec();
        fields.swap(0, 1);
        row = RawRow::new(fields);
        assert_eq!(extract_fields(&row).unwrap().day, "Samstag, 09.10.");
    }

    #[test]
    fn test_extract_rejects_short_table() {
        let fields = sample_row(&[]).fields()[..17].to_vec();
        let err = extract_fields(&RawRow::new(fields)).unwrap_err();
        assert_eq!(err, ExtractionError::TooShort { required: 18, actual: 17 });
    }
}
