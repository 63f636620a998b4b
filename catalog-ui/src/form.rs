//! Book edit form state
//!
//! Scalar inputs are plain strings (blank means "not filled in"). Authors
//! and classification codes are chip lists keyed by dictionary id. Raw
//! codes are shown read-only as comma-joined strings.

use catalog_common::dto::{PubPlaceInput, UpdateBook};
use catalog_common::models::{Author, BookDetail, ClassCode, Publisher};
use catalog_common::normalize::split_codes;

/// Publisher picked from the dictionary, or typed in (`id == 0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherChoice {
    pub id: i64,
    pub name: String,
}

impl From<&Publisher> for PublisherChoice {
    fn from(publisher: &Publisher) -> Self {
        Self {
            id: publisher.id,
            name: publisher.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookForm {
    pub book_id: i64,

    pub title: String,
    pub book_type: String,
    pub edit: String,
    pub edition_statement: String,
    pub series: String,
    pub phys_desc: String,
    pub description: String,

    pub authors: Vec<Author>,
    pub bbks: Vec<ClassCode>,
    pub udcs: Vec<ClassCode>,
    pub grntis: Vec<ClassCode>,

    pub bbk_raw: String,
    pub udc_raw: String,
    pub grnti_raw: String,

    pub pub_city: String,
    pub publisher: Option<PublisherChoice>,
    pub pub_year: Option<i32>,
}

fn join_codes(codes: &[ClassCode]) -> String {
    codes
        .iter()
        .map(|c| c.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn add_chip(list: &mut Vec<ClassCode>, code: ClassCode) -> bool {
    if list.iter().any(|c| c.id == code.id) {
        return false;
    }
    list.push(code);
    true
}

impl BookForm {
    /// Fill the form from a loaded book
    ///
    /// Only the first publication place is editable.
    pub fn prefill(book: &BookDetail) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let first_place = book.publication_places.first();

        Self {
            book_id: book.id,
            title: text(&book.title),
            book_type: text(&book.book_type),
            edit: text(&book.edit),
            edition_statement: text(&book.edition_statement),
            series: text(&book.series),
            phys_desc: text(&book.phys_desc),
            description: text(&book.description),
            authors: book.authors.clone(),
            bbks: book.bbks.iter().map(ClassCode::from).collect(),
            udcs: book.udcs.iter().map(ClassCode::from).collect(),
            grntis: book.grntis.iter().map(ClassCode::from).collect(),
            bbk_raw: book
                .bbk_raws
                .iter()
                .map(|r| r.bbk_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            udc_raw: book
                .udc_raws
                .iter()
                .map(|r| r.udc_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            grnti_raw: book
                .grnti_raws
                .iter()
                .map(|r| r.grnti_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            pub_city: first_place
                .and_then(|p| p.city.clone())
                .unwrap_or_default(),
            publisher: first_place
                .and_then(|p| p.publisher.as_ref())
                .map(PublisherChoice::from),
            pub_year: first_place.and_then(|p| p.pub_year),
        }
    }

    /// Hidden `authors` field: "Last First Patronymic" names joined by "; "
    pub fn authors_field(&self) -> String {
        self.authors
            .iter()
            .map(Author::display_name)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn bbk_field(&self) -> String {
        join_codes(&self.bbks)
    }

    pub fn udc_field(&self) -> String {
        join_codes(&self.udcs)
    }

    pub fn grnti_field(&self) -> String {
        join_codes(&self.grntis)
    }

    pub fn pub_name_field(&self) -> String {
        self.publisher
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    /// Add an author chip; returns false when the author is already listed
    pub fn add_author(&mut self, author: Author) -> bool {
        if self.authors.iter().any(|a| a.id == author.id) {
            return false;
        }
        self.authors.push(author);
        true
    }

    pub fn remove_author(&mut self, id: i64) {
        self.authors.retain(|a| a.id != id);
    }

    pub fn add_bbk(&mut self, code: ClassCode) -> bool {
        add_chip(&mut self.bbks, code)
    }

    pub fn remove_bbk(&mut self, id: i64) {
        self.bbks.retain(|c| c.id != id);
    }

    pub fn add_udc(&mut self, code: ClassCode) -> bool {
        add_chip(&mut self.udcs, code)
    }

    pub fn remove_udc(&mut self, id: i64) {
        self.udcs.retain(|c| c.id != id);
    }

    pub fn add_grnti(&mut self, code: ClassCode) -> bool {
        add_chip(&mut self.grntis, code)
    }

    pub fn remove_grnti(&mut self, id: i64) {
        self.grntis.retain(|c| c.id != id);
    }

    pub fn set_publisher(&mut self, publisher: PublisherChoice) {
        self.publisher = Some(publisher);
    }

    pub fn clear_publisher(&mut self) {
        self.publisher = None;
    }

    /// Typing into the publisher box renames the current choice, or starts
    /// a new one with id 0
    pub fn type_publisher_name(&mut self, name: &str) {
        match &mut self.publisher {
            Some(publisher) => publisher.name = name.to_string(),
            None => {
                self.publisher = Some(PublisherChoice {
                    id: 0,
                    name: name.to_string(),
                })
            }
        }
    }

    /// Partial update carrying only what the form has filled in
    ///
    /// Blank scalars and empty chip lists are left out, so the server keeps
    /// its stored values for them.
    pub fn to_update(&self) -> UpdateBook {
        let chips = |list: &[ClassCode]| -> Option<Vec<String>> {
            (!list.is_empty()).then(|| list.iter().map(|c| c.code.clone()).collect())
        };
        let raw = |value: &str| (!value.is_empty()).then(|| split_codes(value));

        let city = non_blank(&self.pub_city);
        let publisher_name = self.publisher.as_ref().and_then(|p| non_blank(&p.name));
        let pub_year = self.pub_year.filter(|year| *year != 0);
        let pub_places = (city.is_some() || publisher_name.is_some() || pub_year.is_some())
            .then(|| {
                vec![PubPlaceInput {
                    city,
                    publisher_name,
                    pub_year,
                }]
            });

        UpdateBook {
            title: non_blank(&self.title),
            book_type: non_blank(&self.book_type),
            edit: non_blank(&self.edit),
            edition_statement: non_blank(&self.edition_statement),
            series: non_blank(&self.series),
            phys_desc: non_blank(&self.phys_desc),
            description: non_blank(&self.description),
            authors_ids: (!self.authors.is_empty())
                .then(|| self.authors.iter().map(|a| a.id).collect()),
            bbk_abbs: chips(&self.bbks),
            udc_abbs: chips(&self.udcs),
            grnti_codes: chips(&self.grntis),
            bbk_raw_codes: raw(&self.bbk_raw),
            udc_raw_codes: raw(&self.udc_raw),
            grnti_raw_codes: raw(&self.grnti_raw),
            pub_places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::models::{Bbk, BookBbkRaw, BookGrntiRaw, BookPubPlace, Grnti};

    fn author(id: i64, last: &str, first: &str, patronymic: Option<&str>) -> Author {
        Author {
            id,
            first_name: first.to_string(),
            patronymic: patronymic.map(str::to_string),
            last_name: last.to_string(),
            birth_year: None,
        }
    }

    fn sample_book() -> BookDetail {
        BookDetail {
            id: 12,
            title: Some("Механика".to_string()),
            series: Some("Теоретическая физика".to_string()),
            authors: vec![
                author(1, "Ландау", "Лев", Some("Давидович")),
                author(2, "Лифшиц", "Евгений", None),
            ],
            bbks: vec![Bbk {
                id: 5,
                bbk_abb: "22.21".to_string(),
                description: None,
            }],
            grntis: vec![Grnti {
                id: 7,
                code: "29.05.00".to_string(),
                description: Some("Механика".to_string()),
            }],
            bbk_raws: vec![
                BookBbkRaw {
                    book_id: 12,
                    bbk_code: "22.2".to_string(),
                },
                BookBbkRaw {
                    book_id: 12,
                    bbk_code: "22.21я73".to_string(),
                },
            ],
            grnti_raws: vec![BookGrntiRaw {
                book_id: 12,
                grnti_code: "29.05".to_string(),
            }],
            publication_places: vec![BookPubPlace {
                id: 1,
                book_id: 12,
                publisher: Some(Publisher {
                    id: 3,
                    name: "Наука".to_string(),
                }),
                city: Some("Москва".to_string()),
                pub_year: Some(1988),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_prefill() {
        let form = BookForm::prefill(&sample_book());

        assert_eq!(form.title, "Механика");
        assert_eq!(form.book_type, "");
        assert_eq!(form.bbk_raw, "22.2, 22.21я73");
        assert_eq!(form.udc_raw, "");
        assert_eq!(form.pub_city, "Москва");
        assert_eq!(form.pub_year, Some(1988));
        assert_eq!(
            form.publisher,
            Some(PublisherChoice {
                id: 3,
                name: "Наука".to_string()
            })
        );
        assert_eq!(form.grntis, vec![ClassCode { id: 7, code: "29.05.00".to_string() }]);
    }

    #[test]
    fn test_hidden_fields() {
        let form = BookForm::prefill(&sample_book());

        assert_eq!(form.authors_field(), "Ландау Лев Давидович; Лифшиц Евгений");
        assert_eq!(form.bbk_field(), "22.21");
        assert_eq!(form.udc_field(), "");
        assert_eq!(form.grnti_field(), "29.05.00");
        assert_eq!(form.pub_name_field(), "Наука");
    }

    #[test]
    fn test_unedited_form_reproduces_book() {
        let update = BookForm::prefill(&sample_book()).to_update();

        assert_eq!(update.title.as_deref(), Some("Механика"));
        assert_eq!(update.series.as_deref(), Some("Теоретическая физика"));
        assert_eq!(update.book_type, None);
        assert_eq!(update.description, None);
        assert_eq!(update.authors_ids, Some(vec![1, 2]));
        assert_eq!(update.bbk_abbs, Some(vec!["22.21".to_string()]));
        assert_eq!(update.udc_abbs, None);
        assert_eq!(update.grnti_codes, Some(vec!["29.05.00".to_string()]));
        assert_eq!(
            update.bbk_raw_codes,
            Some(vec!["22.2".to_string(), "22.21я73".to_string()])
        );
        assert_eq!(update.udc_raw_codes, None);
        assert_eq!(
            update.pub_places,
            Some(vec![PubPlaceInput {
                city: Some("Москва".to_string()),
                publisher_name: Some("Наука".to_string()),
                pub_year: Some(1988),
            }])
        );
    }

    #[test]
    fn test_blank_strings_never_submitted() {
        let mut form = BookForm::prefill(&sample_book());
        form.title = "   ".to_string();
        form.series = " Курс ".to_string();

        let update = form.to_update();
        assert_eq!(update.title, None);
        assert_eq!(update.series.as_deref(), Some("Курс"));

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("bookType").is_none());
    }

    #[test]
    fn test_chip_add_ignores_duplicates() {
        let mut form = BookForm::prefill(&sample_book());

        assert!(!form.add_author(author(1, "Ландау", "Лев", None)));
        assert!(form.add_author(author(9, "Капица", "Пётр", None)));
        assert_eq!(form.authors.len(), 3);

        assert!(!form.add_grnti(ClassCode { id: 7, code: "29.05.00".to_string() }));
        assert!(form.add_udc(ClassCode { id: 4, code: "531".to_string() }));
        assert_eq!(form.udc_field(), "531");

        form.remove_author(2);
        form.remove_bbk(5);
        assert_eq!(form.authors_field(), "Ландау Лев Давидович; Капица Пётр");
        assert_eq!(form.to_update().bbk_abbs, None);
    }

    #[test]
    fn test_publisher_edits() {
        let mut form = BookForm::default();
        assert_eq!(form.to_update().pub_places, None);

        form.type_publisher_name("Мир");
        assert_eq!(
            form.publisher,
            Some(PublisherChoice {
                id: 0,
                name: "Мир".to_string()
            })
        );

        form.set_publisher(PublisherChoice {
            id: 3,
            name: "Наука".to_string(),
        });
        form.type_publisher_name("Наука и жизнь");
        assert_eq!(form.publisher.as_ref().map(|p| p.id), Some(3));
        assert_eq!(form.pub_name_field(), "Наука и жизнь");

        form.clear_publisher();
        assert_eq!(form.pub_name_field(), "");
    }

    #[test]
    fn test_zero_year_alone_sends_no_place() {
        let mut form = BookForm::default();
        form.pub_year = Some(0);
        assert_eq!(form.to_update().pub_places, None);

        form.pub_city = "Киев".to_string();
        let places = form.to_update().pub_places.unwrap();
        assert_eq!(places[0].city.as_deref(), Some("Киев"));
        assert_eq!(places[0].pub_year, None);
        assert_eq!(places[0].publisher_name, None);
    }

    #[test]
    fn test_raw_field_split() {
        let mut form = BookForm::default();
        form.grnti_raw = "20.15, , 06.81 ".to_string();

        let update = form.to_update();
        assert_eq!(
            update.grnti_raw_codes,
            Some(vec!["20.15".to_string(), "06.81".to_string()])
        );
    }
}
