//! Repository implementations using SeaORM

pub mod book_repository;
pub mod loan_repository;
pub mod user_repository;

pub use book_repository::SeaOrmBookRepository;
pub use loan_repository::SeaOrmLoanRepository;
pub use user_repository::SeaOrmUserRepository;

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};

/// Substring match treating `%`, `_` and `\` in `term` as plain characters
pub(crate) fn contains_literal<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Expr::col((column.entity_name(), column))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}
