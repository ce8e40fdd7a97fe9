pub mod book;
pub mod loan;
pub mod user;

pub use book::Book;
pub use loan::{Loan, LoanDetails};
pub use user::User;
