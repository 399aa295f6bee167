use std::fmt;
use std::str::FromStr;

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::generation::DirectiveError;

/// Named synthetic-data domains usable through `-- type:<preset>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Name,
    Surname,
    Patronymic,
    NameRu,
    SurnameRu,
    PatronymicRu,
    Address,
    AddressRu,
    Phone,
    Email,
}

impl Preset {
    pub const ALL: [Preset; 10] = [
        Preset::Name,
        Preset::Surname,
        Preset::Patronymic,
        Preset::NameRu,
        Preset::SurnameRu,
        Preset::PatronymicRu,
        Preset::Address,
        Preset::AddressRu,
        Preset::Phone,
        Preset::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Name => "name",
            Preset::Surname => "surname",
            Preset::Patronymic => "patronymic",
            Preset::NameRu => "name_ru",
            Preset::SurnameRu => "surname_ru",
            Preset::PatronymicRu => "patronymic_ru",
            Preset::Address => "address",
            Preset::AddressRu => "address_ru",
            Preset::Phone => "phone",
            Preset::Email => "email",
        }
    }

    pub fn generate(self, rng: &mut dyn RngCore) -> String {
        match self {
            Preset::Name | Preset::Patronymic => FirstName().fake_with_rng(rng),
            Preset::Surname => LastName().fake_with_rng(rng),
            Preset::NameRu => pick(RU_FIRST_NAMES, rng).to_string(),
            Preset::SurnameRu => pick(RU_SURNAMES, rng).to_string(),
            Preset::PatronymicRu => pick(RU_PATRONYMICS, rng).to_string(),
            Preset::Address => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                let city: String = CityName().fake_with_rng(rng);
                let state: String = StateAbbr().fake_with_rng(rng);
                let zip: String = ZipCode().fake_with_rng(rng);
                format!("{number} {street}, {city}, {state} {zip}")
            }
            Preset::AddressRu => {
                let city = pick(RU_CITIES, rng);
                let street = pick(RU_STREETS, rng);
                let house = rng.random_range(1..=150);
                format!("г. {city}, ул. {street}, д. {house}")
            }
            Preset::Phone => {
                let operator = rng.random_range(0..=99);
                let block = rng.random_range(0..=999);
                let first = rng.random_range(0..=99);
                let second = rng.random_range(0..=99);
                format!("+7 9{operator:02} {block:03}-{first:02}-{second:02}")
            }
            Preset::Email => SafeEmail().fake_with_rng(rng),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = DirectiveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == value)
            .ok_or_else(|| DirectiveError::UnknownPreset(value.to_string()))
    }
}

fn pick<'a>(values: &'a [&'a str], rng: &mut dyn RngCore) -> &'a str {
    values[rng.random_range(0..values.len())]
}

const RU_FIRST_NAMES: &[&str] = &[
    "Александр",
    "Алексей",
    "Андрей",
    "Борис",
    "Василий",
    "Виктор",
    "Владимир",
    "Дмитрий",
    "Евгений",
    "Иван",
    "Игорь",
    "Константин",
    "Михаил",
    "Никита",
    "Николай",
    "Олег",
    "Павел",
    "Сергей",
    "Фёдор",
    "Юрий",
];

const RU_SURNAMES: &[&str] = &[
    "Иванов",
    "Смирнов",
    "Кузнецов",
    "Попов",
    "Васильев",
    "Петров",
    "Соколов",
    "Михайлов",
    "Новиков",
    "Фёдоров",
    "Морозов",
    "Волков",
    "Алексеев",
    "Лебедев",
    "Семёнов",
    "Егоров",
    "Павлов",
    "Козлов",
    "Степанов",
    "Николаев",
];

const RU_PATRONYMICS: &[&str] = &[
    "Александрович",
    "Алексеевич",
    "Андреевич",
    "Борисович",
    "Васильевич",
    "Викторович",
    "Владимирович",
    "Дмитриевич",
    "Евгеньевич",
    "Иванович",
    "Игоревич",
    "Михайлович",
    "Николаевич",
    "Олегович",
    "Павлович",
    "Сергеевич",
    "Юрьевич",
];

const RU_CITIES: &[&str] = &[
    "Москва",
    "Санкт-Петербург",
    "Новосибирск",
    "Екатеринбург",
    "Казань",
    "Нижний Новгород",
    "Челябинск",
    "Самара",
    "Омск",
    "Ростов-на-Дону",
    "Уфа",
    "Красноярск",
    "Воронеж",
    "Пермь",
    "Волгоград",
];

const RU_STREETS: &[&str] = &[
    "Ленина",
    "Пушкина",
    "Гагарина",
    "Мира",
    "Советская",
    "Садовая",
    "Лесная",
    "Школьная",
    "Набережная",
    "Молодёжная",
    "Центральная",
    "Победы",
    "Кирова",
    "Московская",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn parses_every_known_preset() {
        for preset in Preset::ALL {
            assert_eq!(preset.as_str().parse::<Preset>(), Ok(preset));
        }
        assert_eq!(
            "nickname".parse::<Preset>(),
            Err(DirectiveError::UnknownPreset("nickname".to_string()))
        );
    }

    #[test]
    fn phone_numbers_follow_russian_mobile_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let phone = Preset::Phone.generate(&mut rng);
            assert_eq!(phone.len(), "+7 900 000-00-00".len());
            assert!(phone.starts_with("+7 9"));
            assert_eq!(&phone[6..7], " ");
            assert_eq!(&phone[10..11], "-");
            assert_eq!(&phone[13..14], "-");
        }
    }

    #[test]
    fn english_presets_are_not_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for preset in [Preset::Name, Preset::Surname, Preset::Address] {
            assert!(!preset.generate(&mut rng).is_empty());
        }
        assert!(Preset::Email.generate(&mut rng).contains('@'));
    }

    #[test]
    fn russian_presets_use_embedded_lists() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let name = Preset::NameRu.generate(&mut rng);
        assert!(RU_FIRST_NAMES.contains(&name.as_str()));
        let patronymic = Preset::PatronymicRu.generate(&mut rng);
        assert!(patronymic.ends_with("ич"));
        assert!(Preset::AddressRu.generate(&mut rng).starts_with("г. "));
    }
}
