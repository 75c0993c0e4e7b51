//! DTOs for the directory's JSON wire format.
//!
//! The wire shape is camelCase (`catchPhrase`) with coordinates as strings.
//! Ids arrive as numbers from classic json-server and as numeric strings from
//! newer releases; both decode.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Company, Geo, NewUser, User, UserId};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum UserIdDto {
    Number(u64),
    Text(String),
}

impl UserIdDto {
    fn into_domain(self) -> Result<UserId, String> {
        match self {
            Self::Number(raw) => Ok(UserId::new(raw)),
            Self::Text(raw) => raw
                .trim()
                .parse::<u64>()
                .map(UserId::new)
                .map_err(|error| format!("user id '{raw}' is not numeric: {error}")),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct GeoDto {
    pub(super) lat: String,
    pub(super) lng: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AddressDto {
    pub(super) street: String,
    pub(super) suite: String,
    pub(super) city: String,
    pub(super) zipcode: String,
    pub(super) geo: GeoDto,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct CompanyDto {
    pub(super) name: String,
    pub(super) catch_phrase: String,
    pub(super) bs: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: UserIdDto,
    pub(super) name: String,
    #[serde(default)]
    pub(super) username: String,
    pub(super) email: String,
    #[serde(default)]
    pub(super) phone: String,
    #[serde(default)]
    pub(super) website: String,
    #[serde(default)]
    pub(super) address: AddressDto,
    #[serde(default)]
    pub(super) company: CompanyDto,
}

/// Request body for create and update.
#[derive(Debug, Serialize)]
pub(super) struct NewUserDto {
    pub(super) name: String,
    pub(super) username: String,
    pub(super) email: String,
    pub(super) phone: String,
    pub(super) website: String,
    pub(super) address: AddressDto,
    pub(super) company: CompanyDto,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<User, String> {
        Ok(User {
            id: self.id.into_domain()?,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address: self.address.into(),
            company: self.company.into(),
        })
    }
}

impl From<AddressDto> for Address {
    fn from(dto: AddressDto) -> Self {
        Self {
            street: dto.street,
            suite: dto.suite,
            city: dto.city,
            zipcode: dto.zipcode,
            geo: Geo {
                lat: dto.geo.lat,
                lng: dto.geo.lng,
            },
        }
    }
}

impl From<CompanyDto> for Company {
    fn from(dto: CompanyDto) -> Self {
        Self {
            name: dto.name,
            catch_phrase: dto.catch_phrase,
            bs: dto.bs,
        }
    }
}

impl From<&NewUser> for NewUserDto {
    fn from(user: &NewUser) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: user.website.clone(),
            address: AddressDto {
                street: user.address.street.clone(),
                suite: user.address.suite.clone(),
                city: user.address.city.clone(),
                zipcode: user.address.zipcode.clone(),
                geo: GeoDto {
                    lat: user.address.geo.lat.clone(),
                    lng: user.address.geo.lng.clone(),
                },
            },
            company: CompanyDto {
                name: user.company.name.clone(),
                catch_phrase: user.company.catch_phrase.clone(),
                bs: user.company.bs.clone(),
            },
        }
    }
}
