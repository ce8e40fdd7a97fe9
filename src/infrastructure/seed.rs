use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::lending::DEFAULT_MAX_RENEWALS;
use crate::domain::{DomainError, LoanRepository, NewLoan};
use crate::infrastructure::SeaOrmLoanRepository;
use crate::models::book;
use crate::models::loan;
use crate::models::user::{self, MembershipType, UserStatus};

/// Insert demo books and members, skipping rows that already exist, then
/// open a few loans if the loan table is empty.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    let now = Utc::now();

    // 1. Members
    let users = [
        (
            "Joao Silva",
            "joao.silva@email.com",
            "(11) 99999-9999",
            MembershipType::Student,
            UserStatus::Active,
        ),
        (
            "Maria Santos",
            "maria.santos@email.com",
            "(11) 88888-8888",
            MembershipType::Teacher,
            UserStatus::Active,
        ),
        (
            "Pedro Oliveira",
            "pedro.oliveira@email.com",
            "(11) 77777-7777",
            MembershipType::Community,
            UserStatus::Active,
        ),
        (
            "Ana Costa",
            "ana.costa@email.com",
            "(11) 66666-6666",
            MembershipType::Student,
            UserStatus::Suspended,
        ),
    ];

    for (name, email, phone, membership_type, status) in users {
        let member = user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            phone: Set(phone.to_owned()),
            membership_type: Set(membership_type),
            status: Set(status),
            join_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        user::Entity::insert(member)
            .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 2. Books
    let books = [
        (
            "Clean Code",
            "Robert C. Martin",
            "978-0132350884",
            2008,
            "Technology",
            3,
            "A handbook of agile software craftsmanship.",
        ),
        (
            "The Fellowship of the Ring",
            "J.R.R. Tolkien",
            "978-0547928210",
            1954,
            "Fantasy",
            5,
            "First volume of The Lord of the Rings.",
        ),
        (
            "1984",
            "George Orwell",
            "978-0451524935",
            1949,
            "Fiction",
            2,
            "A dystopia about totalitarianism and surveillance.",
        ),
        (
            "Dom Casmurro",
            "Machado de Assis",
            "978-8525406958",
            1899,
            "Classics",
            4,
            "A classic of Brazilian literature.",
        ),
        (
            "Introduction to Algorithms",
            "Thomas H. Cormen",
            "978-0262033848",
            2009,
            "Technology",
            2,
            "Foundations of algorithms and data structures.",
        ),
        (
            "The Little Prince",
            "Antoine de Saint-Exupery",
            "978-0156012195",
            1943,
            "Children",
            1,
            "A poetic tale about a young prince.",
        ),
    ];

    for (title, author, isbn, year, genre, copies, description) in books {
        let entry = book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            isbn: Set(isbn.to_owned()),
            published_year: Set(year),
            genre: Set(genre.to_owned()),
            total_copies: Set(copies),
            available_copies: Set(copies),
            description: Set(Some(description.to_owned())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        book::Entity::insert(entry)
            .on_conflict(OnConflict::column(book::Column::Isbn).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 3. Loans, through the repository so copy counters stay consistent
    if loan::Entity::find().count(db).await? > 0 {
        tracing::info!("Loans already present, skipping demo loans");
        return Ok(());
    }

    let loans = [
        ("joao.silva@email.com", "978-0132350884", Duration::days(10)),
        ("maria.santos@email.com", "978-0547928210", Duration::days(5)),
        // Already past due, shows up as OVERDUE
        ("pedro.oliveira@email.com", "978-0451524935", Duration::days(-3)),
    ];

    let repository = SeaOrmLoanRepository::new(db.clone());
    for (email, isbn, due_in) in loans {
        let member = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        let title = book::Entity::find()
            .filter(book::Column::Isbn.eq(isbn))
            .one(db)
            .await?;

        if let (Some(member), Some(title)) = (member, title) {
            repository
                .create(NewLoan {
                    user_id: member.id,
                    book_id: title.id,
                    loan_date: now - Duration::days(14),
                    due_date: now + due_in,
                    max_renewals: DEFAULT_MAX_RENEWALS,
                })
                .await?;
        }
    }

    Ok(())
}
