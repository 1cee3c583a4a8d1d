pub mod appointment_services;
pub mod appointments;
pub mod comments;
pub mod service_images;
pub mod services;
pub mod users;

pub use appointment_services::Entity as AppointmentServices;
pub use appointments::Entity as Appointments;
pub use comments::Entity as Comments;
pub use service_images::Entity as ServiceImages;
pub use services::Entity as Services;
pub use users::Entity as Users;
