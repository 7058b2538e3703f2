pub mod accrual;
pub mod logbook;
