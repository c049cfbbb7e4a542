pub mod certificate;
pub mod course_form;
pub mod date_format;
pub mod entity;
pub mod gateway;
pub mod io;
pub mod organization;
pub mod signatory;
pub mod utils;
pub mod validation;

// 重新导出主要结构
pub use certificate::{Certificate, CertificateAttributes, CertificateOptions, CertificateStats};
pub use course_form::{CourseCreationForm, CourseField};
pub use date_format::{translate_directive_format, DatePickerDefaults};
pub use entity::{Editable, EntityState};
pub use gateway::{
    CertificateGateway, CourseCreated, CourseGateway, GatewayError, GatewayResponse,
    InMemoryGateway,
};
pub use organization::Organization;
pub use signatory::Signatory;
pub use utils::{is_blank, CertError};
pub use validation::{ValidationError, ValidationErrorKind, ValidationResult};

// 常量定义
pub const SUPPORTED_EXTENSION: &str = "json";
