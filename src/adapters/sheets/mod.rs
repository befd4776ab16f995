//! Google Sheets persistence adapter.

mod google_sheets_record_store;

pub use google_sheets_record_store::{GoogleSheetsRecordStore, SheetsApiConfig};
