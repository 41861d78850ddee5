//! 订单校验与规范化 - 业务能力层
//!
//! 把原始字段文本转换成类型化的订单。
//! - 数量字段无法解析：整条记录失败（ExtractionError）
//! - 枚举字段无法识别：只标记该字段，订单照常生成

use crate::error::{ExtractionError, FieldValidationError};
use crate::models::order::{Day, Fulfillment, NormalizedOrder, Order, Preparation, SweetLiters};
use crate::models::raw_row::RawRow;
use crate::services::field_extractor::{extract_fields, OrderFields};

/// 解析数量字段，允许首尾空白和负数；只有非整数才算失败
fn parse_count(field: &'static str, value: &str) -> Result<i64, ExtractionError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ExtractionError::InvalidCount {
            field,
            value: value.to_string(),
        })
}

/// 规范化一条订单
pub fn normalize(fields: &OrderFields) -> Result<NormalizedOrder, ExtractionError> {
    let pieces_onion = parse_count("pieces_onion", &fields.pieces_onion)?;
    let trays_onion = parse_count("trays_onion", &fields.trays_onion)?;
    let pieces_flame = parse_count("pieces_flame", &fields.pieces_flame)?;
    let trays_flame = parse_count("trays_flame", &fields.trays_flame)?;

    let sweet_liters = SweetLiters::from_choice(&fields.sweet);
    let preparation = Preparation::from_text(&fields.preparation);
    let fulfillment = Fulfillment::from_text(&fields.fulfillment);
    let day = Day::from_text(&fields.day);

    // 地址规则与上面的 fulfillment 不同：原始文本必须整串等于 "Lieferung"
    let address = if fields.fulfillment == Fulfillment::DELIVERY_TEXT {
        Some(fields.address.clone())
    } else {
        None
    };

    let mut issues = Vec::new();
    if !sweet_liters.is_recognized() {
        issues.push(issue("sweet_liters", &fields.sweet));
    }
    if preparation == Preparation::Unrecognized {
        issues.push(issue("preparation", &fields.preparation));
    }
    if fulfillment == Fulfillment::Unrecognized {
        issues.push(issue("fulfillment", &fields.fulfillment));
    }
    if day == Day::Unrecognized {
        issues.push(issue("day", &fields.day));
    }

    let order = Order {
        pieces_onion,
        trays_onion,
        pieces_flame,
        trays_flame,
        sweet_liters,
        preparation,
        preparation_text: fields.preparation.clone(),
        fulfillment,
        day,
        time_slot: fields.time_slot.clone(),
        first_name: fields.first_name.clone(),
        last_name: fields.last_name.clone(),
        email: fields.email.clone(),
        phone: fields.phone.clone(),
        address,
    };

    Ok(NormalizedOrder { order, issues })
}

fn issue(field: &'static str, raw: &str) -> FieldValidationError {
    FieldValidationError {
        field,
        raw: raw.to_string(),
    }
}

/// 提取 + 规范化
pub fn parse_order(row: &RawRow) -> Result<NormalizedOrder, ExtractionError> {
    let fields = extract_fields(row)?;
    normalize(&fields)
}
