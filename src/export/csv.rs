use csv::Writer;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::Book;

/// File name the snapshot is written under
pub const EXPORT_FILE_NAME: &str = "books.csv";

const HEADERS: [&str; 9] = [
    "#",
    "isbn",
    "title",
    "author",
    "publisher",
    "uploaded",
    "cover",
    "likes",
    "reviews",
];

/// Write a snapshot of the accumulated catalog to `path`.
/// Returns the number of book rows written (header excluded).
pub fn write_catalog(path: &Path, books: &[Book]) -> Result<usize> {
    let wtr = Writer::from_path(path)?;
    write_catalog_to(wtr, books)
}

/// Write the catalog rows to an arbitrary CSV writer
pub fn write_catalog_to<W: Write>(mut wtr: Writer<W>, books: &[Book]) -> Result<usize> {
    wtr.write_record(HEADERS)?;

    for (idx, book) in books.iter().enumerate() {
        wtr.write_record([
            (idx + 1).to_string(),
            book.isbn.clone(),
            book.title.clone(),
            book.author.clone(),
            book.publisher.clone(),
            book.uploaded.to_rfc3339(),
            book.cover.clone(),
            book.likes.to_string(),
            book.reviews.len().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(books.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::model::Review;

    fn sample_book(n: usize, reviews: usize) -> Book {
        Book {
            isbn: format!("978-0-00-{:06}-1", n),
            title: format!("Book {}", n),
            author: format!("Author {}", n),
            publisher: "Test Press".to_string(),
            uploaded: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            cover: format!("https://covers.example/{}.jpg", n),
            likes: n as u64,
            reviews: (0..reviews)
                .map(|i| Review {
                    text: format!("Review {}", i),
                    author: "Reader".to_string(),
                    company: "Journal".to_string(),
                })
                .collect(),
        }
    }

    fn export_to_string(books: &[Book]) -> String {
        let mut buf = Vec::new();
        {
            let wtr = Writer::from_writer(&mut buf);
            write_catalog_to(wtr, books).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_row_count_matches_catalog_length() {
        let books: Vec<Book> = (0..5).map(|n| sample_book(n, n % 3)).collect();

        let out = export_to_string(&books);
        let lines: Vec<&str> = out.lines().collect();
        // Header plus one row per book
        assert_eq!(lines.len(), books.len() + 1);
    }

    #[test]
    fn test_header_and_numbering() {
        let books = vec![sample_book(1, 2)];

        let out = export_to_string(&books);
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "#,isbn,title,author,publisher,uploaded,cover,likes,reviews"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,978-0-00-000001-1,Book 1,"));
        assert!(row.ends_with(",1,2"));
    }

    #[test]
    fn test_empty_catalog_writes_header_only() {
        let out = export_to_string(&[]);
        assert_eq!(out.lines().count(), 1);
    }
}
