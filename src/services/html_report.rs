//! 公开统计页面 HTML 生成
//!
//! 只输出非敏感视图，AllOrders 等含个人信息/营业额的表永远不会出现。

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fmt::Write;

use crate::models::table::{ReportSet, ResultTable};

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_table(table: &ResultTable) -> String {
    let mut html = String::from("<table class=\"dataframe\">\n<thead>\n<tr>");
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell.to_string()));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// 生成公开页面内容
pub fn render_public_html<Tz>(report: &ReportSet, updated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut content = String::new();
    let _ = write!(
        content,
        "<p>Letztes Update: {}</p>",
        updated_at.format("%d-%m-%Y %H:%M:%S")
    );
    let _ = write!(content, "<p>Anzahl Bestellungen: {}</p>", report.order_count);

    for (name, table) in report.public_tables() {
        let _ = write!(content, "<p><h4>{}</h4>", name);
        content.push_str("<figure class=\"wp-block-table dataframe\">");
        content.push_str(&render_table(table));
        content.push_str("</figure></p>");
    }
    content
}
