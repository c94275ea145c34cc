use std::fmt::{Display, Formatter, Result as FmtResult};

/// How a referencing column points at an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMatch {
    /// The column holds `uploads.id`
    UploadId,
    /// The column holds `uploads.url`
    Url,
}

/// A column elsewhere in the forum schema that keeps an upload alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSource {
    PostUpload,
    UserAvatar,
    GravatarAvatar,
    CustomAvatar,
    ProfileBackground,
    CardBackground,
    CategoryLogo,
    CategoryBackground,
    CustomEmoji,
    ThemeField,
}

impl ReferenceSource {
    pub const ALL: [ReferenceSource; 10] = [
        ReferenceSource::PostUpload,
        ReferenceSource::UserAvatar,
        ReferenceSource::GravatarAvatar,
        ReferenceSource::CustomAvatar,
        ReferenceSource::ProfileBackground,
        ReferenceSource::CardBackground,
        ReferenceSource::CategoryLogo,
        ReferenceSource::CategoryBackground,
        ReferenceSource::CustomEmoji,
        ReferenceSource::ThemeField,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ReferenceSource::PostUpload => "post_uploads",
            ReferenceSource::UserAvatar => "users",
            ReferenceSource::GravatarAvatar | ReferenceSource::CustomAvatar => "user_avatars",
            ReferenceSource::ProfileBackground | ReferenceSource::CardBackground => {
                "user_profiles"
            }
            ReferenceSource::CategoryLogo | ReferenceSource::CategoryBackground => "categories",
            ReferenceSource::CustomEmoji => "custom_emojis",
            ReferenceSource::ThemeField => "theme_fields",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ReferenceSource::PostUpload
            | ReferenceSource::CustomEmoji
            | ReferenceSource::ThemeField => "upload_id",
            ReferenceSource::UserAvatar => "uploaded_avatar_id",
            ReferenceSource::GravatarAvatar => "gravatar_upload_id",
            ReferenceSource::CustomAvatar => "custom_upload_id",
            ReferenceSource::ProfileBackground => "profile_background",
            ReferenceSource::CardBackground => "card_background",
            ReferenceSource::CategoryLogo => "uploaded_logo_id",
            ReferenceSource::CategoryBackground => "uploaded_background_id",
        }
    }

    pub fn matches_by(&self) -> ReferenceMatch {
        match self {
            ReferenceSource::ProfileBackground | ReferenceSource::CardBackground => {
                ReferenceMatch::Url
            }
            _ => ReferenceMatch::UploadId,
        }
    }

    /// The `uploads` column this source's column is compared with.
    pub fn upload_column(&self) -> &'static str {
        match self.matches_by() {
            ReferenceMatch::UploadId => "id",
            ReferenceMatch::Url => "url",
        }
    }
}

impl Display for ReferenceSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.table(), self.column())
    }
}
