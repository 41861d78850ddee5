pub mod aggregation;
pub mod field_extractor;
pub mod html_report;
pub mod order_slip;
pub mod order_validator;
pub mod pricing;
pub mod report_writer;
pub mod table_parser;

pub use aggregation::{aggregate, build_report_set, Aggregation};
pub use field_extractor::{extract_fields, OrderFields};
pub use html_report::render_public_html;
pub use order_validator::{normalize, parse_order};
pub use report_writer::ReportWriter;
