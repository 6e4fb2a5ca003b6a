pub mod expense;
pub mod summary;

pub use expense::{Expense, NewExpense};
pub use summary::SummaryRow;
