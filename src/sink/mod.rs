//! 収集済みレコードの出力先
//!
//! クロール完了後に一括で書き込む（レコード単位のストリーミングはしない）。

mod csv_file;
mod json_file;

pub use csv_file::CsvSink;
pub use json_file::JsonSink;
