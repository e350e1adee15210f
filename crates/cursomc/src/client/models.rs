//! Client data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;

use crate::auth::Role;
use crate::city::{CityDetail, State};

/// Legal kind of a client, stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Natural person, identified by a CPF.
    Individual,
    /// Legal entity, identified by a CNPJ.
    Company,
}

impl ClientKind {
    pub fn code(self) -> i64 {
        match self {
            ClientKind::Individual => 1,
            ClientKind::Company => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ClientKind::Individual),
            2 => Some(ClientKind::Company),
            _ => None,
        }
    }
}

impl TryFrom<i64> for ClientKind {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("Invalid client kind: {}", code))
    }
}

/// Client row from the database.
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub document: String,
    #[sqlx(try_from = "i64")]
    pub kind: ClientKind,
}

/// Address row joined with its city and state.
#[derive(Debug, Clone, FromRow)]
pub struct AddressRow {
    pub id: i64,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub zip_code: String,
    pub city_id: i64,
    pub city_name: String,
    pub state_id: i64,
    pub state_name: String,
}

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub zip_code: String,
    pub city: CityDetail,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            street: row.street,
            number: row.number,
            complement: row.complement,
            district: row.district,
            zip_code: row.zip_code,
            city: CityDetail {
                id: row.city_id,
                name: row.city_name,
                state: State {
                    id: row.state_id,
                    name: row.state_name,
                },
            },
        }
    }
}

/// Full client view. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub document: String,
    pub kind: ClientKind,
    pub phones: BTreeSet<String>,
    pub roles: BTreeSet<Role>,
    pub addresses: Vec<Address>,
}

/// Client as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClientSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Request to register a new client with its first address.
///
/// Missing fields deserialize to empty values and are reported by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewClientRequest {
    pub name: String,
    pub email: String,
    pub document: String,
    pub kind: i64,
    pub password: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub zip_code: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub phone3: Option<String>,
    pub city_id: i64,
}

impl NewClientRequest {
    /// Non-blank phones in submission order, without duplicates.
    pub fn phones(&self) -> Vec<String> {
        let mut phones: Vec<String> = Vec::with_capacity(3);
        let candidates = [
            Some(&self.phone1),
            self.phone2.as_ref(),
            self.phone3.as_ref(),
        ];
        for phone in candidates.into_iter().flatten() {
            let phone = phone.trim();
            if !phone.is_empty() && !phones.iter().any(|p| p == phone) {
                phones.push(phone.to_string());
            }
        }
        phones
    }
}

/// Validated registration data ready to be stored.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub document: String,
    pub kind: ClientKind,
    pub password_hash: String,
    pub phones: Vec<String>,
    pub address: NewAddress,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub zip_code: String,
    pub city_id: i64,
}

/// Request to change a client's name and email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateClientRequest {
    pub name: String,
    pub email: String,
}

/// Sortable client columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "email" => Ok(SortField::Email),
            _ => Err(format!("Cannot order by '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(format!("Invalid sort direction '{}'", s)),
        }
    }
}

/// Upper bound on `lines_per_page`.
pub const MAX_LINES_PER_PAGE: i64 = 100;

/// Paging query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: i64,
    pub lines_per_page: i64,
    pub order_by: String,
    pub direction: String,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            lines_per_page: 24,
            order_by: "name".to_string(),
            direction: "ASC".to_string(),
        }
    }
}

/// Checked paging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: i64,
    pub size: i64,
    pub order_by: SortField,
    pub direction: Direction,
}

impl PageSpec {
    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

impl TryFrom<&PageRequest> for PageSpec {
    type Error = String;

    fn try_from(request: &PageRequest) -> Result<Self, Self::Error> {
        if request.page < 0 {
            return Err("page must not be negative".to_string());
        }
        if !(1..=MAX_LINES_PER_PAGE).contains(&request.lines_per_page) {
            return Err(format!(
                "lines_per_page must be between 1 and {}",
                MAX_LINES_PER_PAGE
            ));
        }
        if request.page.checked_mul(request.lines_per_page).is_none() {
            return Err("page is out of range".to_string());
        }

        Ok(Self {
            page: request.page,
            size: request.lines_per_page,
            order_by: request.order_by.parse()?,
            direction: request.direction.parse()?,
        })
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number: i64,
    pub size: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, spec: &PageSpec) -> Self {
        let total_pages = (total_elements + spec.size - 1) / spec.size;
        Self {
            content,
            total_elements,
            total_pages,
            number: spec.page,
            size: spec.size,
            first: spec.page == 0,
            last: spec.page.saturating_add(1) >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(page: i64, size: i64) -> PageSpec {
        PageSpec {
            page,
            size,
            order_by: SortField::Name,
            direction: Direction::Asc,
        }
    }

    #[test]
    fn test_client_kind_codes() {
        assert_eq!(ClientKind::from_code(1), Some(ClientKind::Individual));
        assert_eq!(ClientKind::from_code(2), Some(ClientKind::Company));
        assert_eq!(ClientKind::from_code(3), None);
        assert_eq!(ClientKind::Company.code(), 2);
        assert!(ClientKind::try_from(0).is_err());
    }

    #[test]
    fn test_phones_skip_blank_and_duplicates() {
        let request = NewClientRequest {
            phone1: "27363323".to_string(),
            phone2: Some(" ".to_string()),
            phone3: Some("27363323".to_string()),
            ..NewClientRequest::default()
        };
        assert_eq!(request.phones(), ["27363323"]);
    }

    #[test]
    fn test_page_request_defaults() {
        let spec = PageSpec::try_from(&PageRequest::default()).unwrap();
        assert_eq!(spec, self::spec(0, 24));
    }

    #[test]
    fn test_page_request_rejects_bad_parameters() {
        let bad = [
            PageRequest {
                page: -1,
                ..PageRequest::default()
            },
            PageRequest {
                lines_per_page: 0,
                ..PageRequest::default()
            },
            PageRequest {
                lines_per_page: MAX_LINES_PER_PAGE + 1,
                ..PageRequest::default()
            },
            PageRequest {
                order_by: "password_hash".to_string(),
                ..PageRequest::default()
            },
            PageRequest {
                direction: "sideways".to_string(),
                ..PageRequest::default()
            },
            PageRequest {
                page: i64::MAX / 10,
                lines_per_page: MAX_LINES_PER_PAGE,
                ..PageRequest::default()
            },
        ];
        for request in &bad {
            assert!(PageSpec::try_from(request).is_err(), "{request:?}");
        }
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);
        assert_eq!("Asc".parse::<Direction>().unwrap(), Direction::Asc);
    }

    #[test]
    fn test_page_math() {
        let page: Page<i64> = Page::new(vec![1, 2], 5, &spec(0, 2));
        assert_eq!(page.total_pages, 3);
        assert!(page.first);
        assert!(!page.last);

        let page: Page<i64> = Page::new(vec![5], 5, &spec(2, 2));
        assert!(!page.first);
        assert!(page.last);

        let page: Page<i64> = Page::new(vec![], 0, &spec(0, 24));
        assert_eq!(page.total_pages, 0);
        assert!(page.first && page.last);

        let page: Page<i64> = Page::new(vec![], 5, &spec(i64::MAX, 1));
        assert!(page.last);
    }

    #[test]
    fn test_largest_page_offset_fits() {
        let request = PageRequest {
            page: i64::MAX / MAX_LINES_PER_PAGE,
            lines_per_page: MAX_LINES_PER_PAGE,
            ..PageRequest::default()
        };
        let spec = PageSpec::try_from(&request).unwrap();
        assert!(spec.offset() > 0);
    }
}
