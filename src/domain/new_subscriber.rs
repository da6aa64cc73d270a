use super::{PhoneNumber, SubscriberName};

/// Validated sign-up request.
#[derive(Debug)]
pub struct NewSubscriber {
    pub full_name: SubscriberName,
    pub phone_number: PhoneNumber,
}

/// Where validation failed. Name errors win when both fields are invalid.
#[derive(Debug, PartialEq, Eq)]
pub enum InvalidField {
    Name(String),
    Phone(String),
}

impl NewSubscriber {
    pub fn parse(full_name: &str, phone_number: &str) -> Result<Self, InvalidField> {
        let full_name = SubscriberName::parse(full_name).map_err(InvalidField::Name)?;
        let phone_number = PhoneNumber::parse(phone_number).map_err(InvalidField::Phone)?;
        Ok(Self {
            full_name,
            phone_number,
        })
    }
}
