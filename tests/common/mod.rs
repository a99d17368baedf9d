use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 5] = ["customerId", "payeeId", "amount", "currency", "idempotencyKey"];

#[allow(dead_code)]
pub fn generate_csv(path: &Path, rows: &[[&str; 5]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generates a run of small allowed payments for one customer, each with a
/// distinct idempotency key.
#[allow(dead_code)]
pub fn generate_bulk_csv(path: &Path, customer: &str, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;
    for i in 1..=rows {
        wtr.write_record([customer, "m_001", "1.0", "USD", &format!("idem-{i}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generates a load of requests with randomized amounts, one distinct
/// customer per row. Amounts stay in [1.00, 99.99], under both the review
/// threshold and the initial balance, so every row is decidable as allow.
#[allow(dead_code)]
pub fn generate_load_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let mut rng = rand::thread_rng();
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;
    for i in 1..=rows {
        let amount = format!("{}.{:02}", rng.gen_range(1..100), rng.gen_range(0..100));
        wtr.write_record([
            &format!("c_load_{i}"),
            "m_001",
            &amount,
            "USD",
            &format!("idem-load-{i}"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
