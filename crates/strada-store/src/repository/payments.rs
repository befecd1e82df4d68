//! # Payment Table
//!
//! Adapter for `payments.csv`. Amounts are rendered to two decimal places
//! by the `Money` serde form.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strada_core::{Money, Payment};

use crate::error::StoreResult;
use crate::repository::{read_rows, write_rows};

pub const FILE_NAME: &str = "payments.csv";

const HEADER: [&str; 6] = [
    "id",
    "rentalId",
    "baseAmount",
    "surcharges",
    "total",
    "description",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRecord {
    id: String,
    rental_id: String,
    base_amount: Money,
    surcharges: Money,
    total: Money,
    description: String,
}

impl From<&Payment> for PaymentRecord {
    fn from(p: &Payment) -> Self {
        PaymentRecord {
            id: p.id.clone(),
            rental_id: p.rental_id.clone(),
            base_amount: p.base_amount,
            surcharges: p.surcharges,
            total: p.total,
            description: p.description.clone(),
        }
    }
}

impl PaymentRecord {
    fn into_payment(self) -> Payment {
        Payment {
            id: self.id,
            rental_id: self.rental_id,
            base_amount: self.base_amount,
            surcharges: self.surcharges,
            total: self.total,
            description: self.description,
        }
    }
}

/// Load/save adapter for the payment table.
#[derive(Debug, Clone)]
pub struct PaymentStore {
    path: PathBuf,
}

impl PaymentStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        PaymentStore { path }
    }

    pub fn load_all(&self) -> StoreResult<Vec<Payment>> {
        let rows: Vec<PaymentRecord> = read_rows(&self.path)?;
        Ok(rows.into_iter().map(PaymentRecord::into_payment).collect())
    }

    pub fn save_all(&self, payments: &[Payment]) -> StoreResult<()> {
        let rows: Vec<PaymentRecord> = payments.iter().map(PaymentRecord::from).collect();
        write_rows(&self.path, &HEADER, &rows)
    }

    pub fn save_one(&self, payment: &Payment) -> StoreResult<()> {
        let mut all = self.load_all()?;
        match all.iter_mut().find(|p| p.id == payment.id) {
            Some(slot) => *slot = payment.clone(),
            None => all.push(payment.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> StoreResult<Option<Payment>> {
        Ok(self.load_all()?.into_iter().find(|p| p.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_amounts_render_two_decimals() {
        let dir = tempdir().unwrap();
        let store = PaymentStore::new(dir.path().join(FILE_NAME));

        let payment = Payment::new(
            "P1001",
            "R1001",
            Money::from_cents(600),
            Money::from_cents(350),
            "Rental R1001 in London + London surcharge",
        );
        store.save_all(&[payment]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(
            raw.lines().next().unwrap(),
            "id,rentalId,baseAmount,surcharges,total,description"
        );
        assert!(raw.contains("6.00,3.50,9.50"), "raw: {raw}");

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded[0].total, Money::from_cents(950));
        assert_eq!(loaded[0].description, "Rental R1001 in London + London surcharge");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let dir = tempdir().unwrap();
        let store = PaymentStore::new(dir.path().join(FILE_NAME));

        let payment = Payment::new("P1002", "R1002", Money::from_cents(600), Money::zero(), "Rental R1002 in Milan");
        store.save_all(&[payment]).unwrap();

        let first = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        let reloaded = store.load_all().unwrap();
        store.save_all(&reloaded).unwrap();
        let second = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(first, second);
    }
}
