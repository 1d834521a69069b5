use super::ServiceName;
use serde::Deserialize;
use time::{macros::format_description, Date};

/// The JSON payload accepted by the create and update endpoints. Dates come
/// in as `YYYY-MM-DD` strings; an absent or empty `end_date` means the
/// subscription has no end.
#[derive(Debug, Deserialize)]
pub struct CreateSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A `CreateSubscription` whose fields have been parse-validated.
#[derive(Debug)]
pub struct NewSubscription {
    pub service_name: ServiceName,
    pub price: i32,
    pub user_id: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

impl TryFrom<CreateSubscription> for NewSubscription {
    type Error = ValidationError;

    fn try_from(input: CreateSubscription) -> Result<Self, Self::Error> {
        let service_name =
            ServiceName::parse(input.service_name).map_err(ValidationError::InvalidServiceName)?;

        let start_date = parse_date(&input.start_date)
            .map_err(|_| ValidationError::InvalidStartDate(input.start_date.clone()))?;

        let end_date = match input.end_date.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                parse_date(raw).map_err(|_| ValidationError::InvalidEndDate(raw.to_owned()))?,
            ),
        };

        if let Some(end_date) = end_date {
            if end_date < start_date {
                return Err(ValidationError::EndDateBeforeStartDate {
                    start_date,
                    end_date,
                });
            }
        }

        Ok(Self {
            service_name,
            price: input.price,
            user_id: input.user_id,
            start_date,
            end_date,
        })
    }
}

pub fn parse_date(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input, format_description!("[year]-[month]-[day]"))
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("`{0}` is not a valid start date, expected YYYY-MM-DD")]
    InvalidStartDate(String),
    #[error("`{0}` is not a valid end date, expected YYYY-MM-DD")]
    InvalidEndDate(String),
    #[error("end date `{end_date}` precedes start date `{start_date}`")]
    EndDateBeforeStartDate { start_date: Date, end_date: Date },
    #[error("{0}")]
    InvalidServiceName(String),
    #[error("`{0}` is not a valid date_from, expected YYYY-MM-DD")]
    InvalidDateFrom(String),
    #[error("`{0}` is not a valid date_to, expected YYYY-MM-DD")]
    InvalidDateTo(String),
}
