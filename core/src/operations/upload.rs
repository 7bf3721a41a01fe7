//! Image uploads. All three endpoints take a single multipart field `file`.

use serde::{Deserialize, Serialize};

use super::{record_or_default, Operation};
use crate::error::ApiError;
use crate::multipart::MultipartForm;
use crate::request::RequestDescriptor;
use crate::types::{Enveloped, FileUpload, PassportRecognition};

pub const FILE_FIELD: &str = "file";

/// An image picked on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "image/jpeg".to_string(),
            bytes,
        }
    }

    fn descriptor(&self, path: &str) -> Result<RequestDescriptor, ApiError> {
        if self.bytes.is_empty() {
            return Err(ApiError::InvalidRequest(format!("{} is empty", self.file_name)));
        }
        let form = MultipartForm::new().file(
            FILE_FIELD,
            self.file_name.clone(),
            self.content_type.clone(),
            self.bytes.clone(),
        );
        Ok(RequestDescriptor::post(path).public().multipart(form))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFaceImage(pub ImageFile);

impl Operation for UploadFaceImage {
    const NAME: &'static str = "auth.upload.profile-image";
    type Body = Enveloped<FileUpload>;
    type Output = FileUpload;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        self.0.descriptor("auth/upload/profile-image")
    }

    fn output(body: Self::Body) -> FileUpload {
        record_or_default(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPassportImage(pub ImageFile);

impl Operation for UploadPassportImage {
    const NAME: &'static str = "auth.upload.passport-image";
    type Body = Enveloped<FileUpload>;
    type Output = FileUpload;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        self.0.descriptor("auth/upload/passport-image")
    }

    fn output(body: Self::Body) -> FileUpload {
        record_or_default(body)
    }
}

/// Upload a passport photo and read its fields back via OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizePassport(pub ImageFile);

impl Operation for RecognizePassport {
    const NAME: &'static str = "auth.upload.passport-recognition";
    type Body = Enveloped<PassportRecognition>;
    type Output = PassportRecognition;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        self.0.descriptor("auth/upload/passport-recognition")
    }

    fn output(body: Self::Body) -> PassportRecognition {
        record_or_default(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::Part;
    use crate::operations::testing::output_of;
    use crate::request::Payload;

    #[test]
    fn upload_is_public_multipart_with_file_field() {
        let op = UploadFaceImage(ImageFile::jpeg("face.jpg", vec![0xff, 0xd8]));
        let d = op.descriptor().unwrap();
        assert!(d.is_public());
        assert_eq!(d.path(), "auth/upload/profile-image");
        let Some(Payload::Multipart(form)) = d.body else {
            panic!("expected multipart");
        };
        let Part { name, file_name, content_type, bytes } = &form.parts()[0];
        assert_eq!(name, "file");
        assert_eq!(file_name, "face.jpg");
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(bytes, &vec![0xff, 0xd8]);
    }

    #[test]
    fn empty_image_is_rejected_before_sending() {
        let op = UploadPassportImage(ImageFile::jpeg("p.jpg", Vec::new()));
        assert!(matches!(op.descriptor(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn upload_result_defaults_when_missing() {
        assert_eq!(output_of::<UploadFaceImage>("{}"), FileUpload::default());
        let up = output_of::<UploadPassportImage>(r#"{"data":{"key":"private/passport/x.jpg","uri":"https://s3/x"}}"#);
        assert_eq!(up.key, "private/passport/x.jpg");
    }

    #[test]
    fn recognition_reads_ocr_fields() {
        let r = output_of::<RecognizePassport>(r#"{"data":{"ocr_number":"M123","ocr_nationality":"KOR"}}"#);
        assert_eq!(r.number, "M123");
        assert_eq!(r.nationality, "KOR");
    }
}
