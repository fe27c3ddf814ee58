//! CSV export of ledger transactions.
//!
//! The format is flat: no quoting and one line per transaction. Commas
//! and line breaks inside comments are replaced with spaces so every line keeps
//! exactly eight fields.

use crate::{
    entities::transaction,
    errors::{Error, Result},
};
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 8] = [
    "ID",
    "Date",
    "CategoryId",
    "SubcategoryId",
    "Amount",
    "CurrencyId",
    "WalletId",
    "Comment",
];

fn sanitize_comment(comment: Option<&str>) -> String {
    comment
        .unwrap_or_default()
        .replace([',', '\n', '\r'], " ")
}

fn write_rows<W: Write>(out: W, transactions: &[transaction::Model]) -> Result<W> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for t in transactions {
        writer.write_record([
            t.id.to_string(),
            t.date.format("%Y-%m-%d").to_string(),
            t.category_id.to_string(),
            t.subcategory_id.map(|id| id.to_string()).unwrap_or_default(),
            t.amount.to_string(),
            t.currency_id.to_string(),
            t.wallet_id.to_string(),
            sanitize_comment(t.comment.as_deref()),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

/// Renders `transactions` as CSV text, header first.
pub fn export_transactions_csv(transactions: &[transaction::Model]) -> Result<String> {
    let bytes = write_rows(Vec::new(), transactions)?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::other(e)))
}

/// Writes `transactions` as CSV to `path`, replacing any existing file.
pub fn write_transactions_csv<P: AsRef<Path>>(
    path: P,
    transactions: &[transaction::Model],
) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_rows(file, transactions)?;
    info!(
        rows = transactions.len(),
        "Exported transactions to {:?}",
        path.as_ref()
    );
    Ok(())
}
