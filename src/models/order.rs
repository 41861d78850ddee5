//! 规范化后的订单

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FieldValidationError;

/// 一个烤盘 = 9 块
pub const PIECES_PER_TRAY: i64 = 9;

/// 无法识别的枚举值在报表中的标记
pub const ERROR_MARKER: &str = "error";

/// 没有地址时的占位值
pub const NO_ADDRESS: &str = "none";

/// 新酒（Neuer Süßer）选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SweetLiters {
    #[serde(rename = "0")]
    Keiner,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "error")]
    Unrecognized,
}

impl SweetLiters {
    /// 按前缀解析（区分大小写）
    pub fn from_choice(text: &str) -> Self {
        if text.starts_with("keiner") {
            SweetLiters::Keiner
        } else if text.starts_with('1') {
            SweetLiters::One
        } else if text.starts_with('2') {
            SweetLiters::Two
        } else if text.starts_with('3') {
            SweetLiters::Three
        } else {
            SweetLiters::Unrecognized
        }
    }

    /// 1L / 2L / 3L 三个标志位，无法识别时返回 None
    pub fn flags(self) -> Option<[u32; 3]> {
        match self {
            SweetLiters::Keiner => Some([0, 0, 0]),
            SweetLiters::One => Some([1, 0, 0]),
            SweetLiters::Two => Some([0, 1, 0]),
            SweetLiters::Three => Some([0, 0, 1]),
            SweetLiters::Unrecognized => None,
        }
    }

    /// 升数（1×flag1 + 2×flag2 + 3×flag3），无法识别按 0 计
    pub fn liters(self) -> u32 {
        match self.flags() {
            Some([one, two, three]) => one + 2 * two + 3 * three,
            None => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SweetLiters::Keiner => "0",
            SweetLiters::One => "1L",
            SweetLiters::Two => "2L",
            SweetLiters::Three => "3L",
            SweetLiters::Unrecognized => ERROR_MARKER,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != SweetLiters::Unrecognized
    }
}

/// 制作方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preparation {
    /// 预烤（Vorgebacken）
    Baked,
    /// 成品（Fertig）
    Unbaked,
    #[serde(rename = "error")]
    Unrecognized,
}

impl Preparation {
    pub fn from_text(text: &str) -> Self {
        if text.starts_with("Vorgebacken") {
            Preparation::Baked
        } else if text.starts_with("Fertig") {
            Preparation::Unbaked
        } else {
            Preparation::Unrecognized
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preparation::Baked => "baked",
            Preparation::Unbaked => "unbaked",
            Preparation::Unrecognized => ERROR_MARKER,
        }
    }
}

/// 取货方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fulfillment {
    /// 自取（Abholung）
    Pickup,
    /// 配送（Lieferung）
    Delivery,
    #[serde(rename = "error")]
    Unrecognized,
}

impl Fulfillment {
    /// 配送方式的原始文本，地址规则按此字面值整串比较
    pub const DELIVERY_TEXT: &'static str = "Lieferung";

    pub fn from_text(text: &str) -> Self {
        if text.starts_with("Abholung") {
            Fulfillment::Pickup
        } else if text.starts_with(Self::DELIVERY_TEXT) {
            Fulfillment::Delivery
        } else {
            Fulfillment::Unrecognized
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Fulfillment::Pickup => "pickup",
            Fulfillment::Delivery => "delivery",
            Fulfillment::Unrecognized => ERROR_MARKER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Fulfillment::Pickup => "Abholung",
            Fulfillment::Delivery => "Lieferung",
            Fulfillment::Unrecognized => "Fehler",
        }
    }
}

/// 取货日
///
/// 变体顺序即排序顺序：Saturday < Sunday < error。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Saturday,
    Sunday,
    #[serde(rename = "error")]
    Unrecognized,
}

impl Day {
    pub fn from_text(text: &str) -> Self {
        if text.starts_with("Samstag") {
            Day::Saturday
        } else if text.starts_with("Sonntag") {
            Day::Sunday
        } else {
            Day::Unrecognized
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
            Day::Unrecognized => ERROR_MARKER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Saturday => "Samstag",
            Day::Sunday => "Sonntag",
            Day::Unrecognized => "Fehler",
        }
    }
}

macro_rules! impl_display_by_name {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.name())
                }
            }
        )*
    };
}

impl_display_by_name!(SweetLiters, Preparation, Fulfillment, Day);

/// 规范化后的订单，构建后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub pieces_onion: i64,
    pub trays_onion: i64,
    pub pieces_flame: i64,
    pub trays_flame: i64,
    pub sweet_liters: SweetLiters,
    pub preparation: Preparation,
    /// 做法的原始文本，单据上原样打印
    pub preparation_text: String,
    pub fulfillment: Fulfillment,
    pub day: Day,
    pub time_slot: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// 只有原始取货文本恰好是 "Lieferung" 时才有地址
    pub address: Option<String>,
}

/// 块数 + 9 × 盘数，超出 i64 范围时取边界值
fn piece_equivalents(pieces: i64, trays: i64) -> i64 {
    pieces.saturating_add(PIECES_PER_TRAY.saturating_mul(trays))
}

impl Order {
    /// 洋葱饼折算块数
    pub fn onion_piece_equivalents(&self) -> i64 {
        piece_equivalents(self.pieces_onion, self.trays_onion)
    }

    /// 火焰饼折算块数
    pub fn flame_piece_equivalents(&self) -> i64 {
        piece_equivalents(self.pieces_flame, self.trays_flame)
    }

    pub fn total_piece_equivalents(&self) -> i64 {
        self.onion_piece_equivalents()
            .saturating_add(self.flame_piece_equivalents())
    }

    pub fn sweet_liter_total(&self) -> u32 {
        self.sweet_liters.liters()
    }

    /// 地址或占位值 "none"
    pub fn address_or_none(&self) -> &str {
        self.address.as_deref().unwrap_or(NO_ADDRESS)
    }

    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 配送订单却没有地址：原始文本带了后缀（如 "Lieferung (+2€)"）
    pub fn is_delivery_without_address(&self) -> bool {
        self.fulfillment == Fulfillment::Delivery && self.address.is_none()
    }

    /// 列出所有无法识别的枚举字段
    pub fn unrecognized_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.sweet_liters.is_recognized() {
            fields.push("sweet_liters");
        }
        if self.preparation == Preparation::Unrecognized {
            fields.push("preparation");
        }
        if self.fulfillment == Fulfillment::Unrecognized {
            fields.push("fulfillment");
        }
        if self.day == Day::Unrecognized {
            fields.push("day");
        }
        fields
    }
}

/// 规范化结果：订单 + 软校验问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOrder {
    pub order: Order,
    pub issues: Vec<FieldValidationError>,
}
