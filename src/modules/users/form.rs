//! `multipart/form-data` bodies for the user create/update/patch endpoints.
//!
//! Text parts become named fields; a part named `avatar` carrying a file is
//! kept as raw bytes together with its declared content type.

use std::collections::HashMap;

use anyhow::anyhow;
use axum::extract::Multipart;
use xs_core::AppError;
use xs_models::{AvatarUpload, CreateUserDto, PatchUserDto, UpdateUserDto};

const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Default)]
pub struct UserForm {
    fields: HashMap<String, String>,
    pub avatar: Option<AvatarUpload>,
}

impl UserForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UserForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == AVATAR_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(anyhow!("Failed to read avatar: {}", e)))?;
                // browsers send an empty part when no file is chosen
                if !data.is_empty() {
                    form.avatar = Some(AvatarUpload {
                        content_type,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::bad_request(anyhow!("Invalid value for {}: {}", name, e)))?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    fn required(&mut self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::bad_request(anyhow!("{} is required", name)))
    }

    /// Blank values count as absent. Values are trimmed, except passwords.
    fn optional(&mut self, name: &str) -> Option<String> {
        let value = self.fields.remove(name)?;
        if value.trim().is_empty() {
            return None;
        }
        if name == "password" {
            Some(value)
        } else {
            Some(value.trim().to_string())
        }
    }

    pub fn into_create(mut self) -> Result<(CreateUserDto, Option<AvatarUpload>), AppError> {
        let dto = CreateUserDto {
            login: self.required("login")?,
            password: self.required("password")?,
            role: self.required("role")?,
            full_name: self.optional("full_name"),
            phone: self.optional("phone"),
        };
        Ok((dto, self.avatar))
    }

    pub fn into_update(mut self) -> Result<(UpdateUserDto, Option<AvatarUpload>), AppError> {
        let dto = UpdateUserDto {
            login: self.required("login")?,
            full_name: self.required("full_name")?,
            phone: self.required("phone")?,
            password: self.required("password")?,
            role: self.required("role")?,
        };
        Ok((dto, self.avatar))
    }

    pub fn into_patch(mut self) -> (PatchUserDto, Option<AvatarUpload>) {
        let dto = PatchUserDto {
            login: self.optional("login"),
            full_name: self.optional("full_name"),
            phone: self.optional("phone"),
            password: self.optional("password"),
            role: self.optional("role"),
        };
        (dto, self.avatar)
    }
}
