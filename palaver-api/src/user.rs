#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub username: String,
    pub image: UserImage,
}

impl User {
    pub fn stub() -> User {
        User {
            username: String::from("stub"),
            image: UserImage::default(),
        }
    }
}

/// Avatar urls. The store keeps them under their file format names.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserImage {
    #[serde(rename = "png", alias = "small")]
    pub small: String,

    #[serde(rename = "webp", alias = "large")]
    pub large: String,
}
