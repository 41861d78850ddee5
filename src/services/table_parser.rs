//! HTML 表格解析 - 业务能力层
//!
//! 从订单邮件正文中取出第一张表格，返回每行的单元格文本。
//! 只做结构提取，不关心字段含义。
//!
//! 限制：
//! - 嵌套在单元格里的表格被压平成该单元格的文本
//! - 命名实体只解码 XML 五个、Latin-1 全部和几个常用标点，其余原样保留；
//!   数字实体全部解码

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ExtractionError;
use crate::models::raw_row::RawRow;

fn table_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(/?)table\b[^>]*>").expect("valid regex"))
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid regex"))
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]\s*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("valid regex"))
}

/// U+00A0..=U+00FF 的命名实体，按码位顺序
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc",
    "uuml", "yacute", "thorn", "yuml",
];

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "euro" => '€',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "sbquo" => '‚',
        "ldquo" => '“',
        "rdquo" => '”',
        "bdquo" => '„',
        "bull" => '•',
        "trade" => '™',
        _ => {
            let offset = LATIN1_ENTITIES.iter().position(|n| *n == name)?;
            return char::from_u32(0xA0 + offset as u32);
        }
    };
    Some(ch)
}

/// 解码 HTML 实体，未知实体原样保留
fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(name)
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// 第一张顶层表格的内部 HTML（开始标签之后、匹配的结束标签之前）；
/// 缺少结束标签时取到文末
fn first_table_body(html: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    for tag in table_tag_re().captures_iter(html) {
        let whole = tag.get(0)?;
        let closing = !tag[1].is_empty();
        match (closing, depth) {
            (false, 0) => {
                start = Some(whole.end());
                depth = 1;
            }
            (false, _) => depth += 1,
            (true, 0) => {}
            (true, 1) => return Some(&html[start?..whole.start()]),
            (true, _) => depth -= 1,
        }
    }
    start.map(|s| &html[s..])
}

/// 把嵌套表格替换成它的纯文本，避免内层的 tr/td 打断外层结构
fn flatten_nested_tables(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut depth = 0usize;
    let mut copied_to = 0usize;
    let mut nested_start = 0usize;
    for tag in table_tag_re().captures_iter(body) {
        let Some(whole) = tag.get(0) else { continue };
        let closing = !tag[1].is_empty();
        if !closing {
            if depth == 0 {
                out.push_str(&body[copied_to..whole.start()]);
                nested_start = whole.start();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                out.push(' ');
                out.push_str(&cell_text(&body[nested_start..whole.end()]));
                out.push(' ');
                copied_to = whole.end();
            }
        }
    }
    if depth > 0 {
        out.push_str(&cell_text(&body[nested_start..]));
    } else {
        out.push_str(&body[copied_to..]);
    }
    out
}

/// 单元格文本：去标签、解码实体、合并空白
fn cell_text(inner_html: &str) -> String {
    let without_tags = tag_re().replace_all(inner_html, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 解析第一张表格
///
/// 没有表格时返回 None。
pub fn parse_first_table(html: &str) -> Option<Vec<Vec<String>>> {
    let body = flatten_nested_tables(first_table_body(html)?);

    let rows = row_re()
        .captures_iter(&body)
        .map(|row| {
            let inner = row.get(1).map(|m| m.as_str()).unwrap_or_default();
            cell_re()
                .captures_iter(inner)
                .map(|cell| cell_text(cell.get(1).map(|m| m.as_str()).unwrap_or_default()))
                .collect()
        })
        .collect();

    Some(rows)
}

/// 邮件正文 → 原始订单表格
pub fn parse_message(html: &str) -> Result<RawRow, ExtractionError> {
    let rows = parse_first_table(html).ok_or(ExtractionError::NoTable)?;
    RawRow::from_cells(rows)
}
