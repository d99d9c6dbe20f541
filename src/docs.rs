use crate::api::company::{CompanyListResponse, CompanyQuery, CreateCompany};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::punch::{PunchRequest, PunchResponse};
use crate::api::time_record::{TimeRecordListResponse, TimeRecordQuery, TimeRecordResponse};
use crate::core::punch::PunchAction;
use crate::model::company::Company;
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Clock API",
        version = "1.0.0",
        description = r#"
## Employee Time Clock

Employees punch with a 6-digit code; administrators manage companies and
employees and export attendance reports.

### 🔹 Key Features
- **Punch terminal**
  - check_in, start_break, end_break and check_out against today's record
- **Company & Employee Management**
  - Create, update, list, and delete, with auto-generated unique auth codes
- **Attendance Reports**
  - Per-day worked hours, lateness and overtime, JSON or CSV export

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::punch::punch,

        crate::api::company::create_company,
        crate::api::company::list_companies,
        crate::api::company::get_company,
        crate::api::company::update_company,
        crate::api::company::delete_company,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::time_record::list_time_records,
        crate::api::time_record::get_time_record,
        crate::api::time_record::update_time_record,
        crate::api::time_record::delete_time_record,
        crate::api::export::export_time_records
    ),
    components(
        schemas(
            PunchRequest,
            PunchResponse,
            PunchAction,
            CreateCompany,
            Company,
            CompanyQuery,
            CompanyListResponse,
            CreateEmployee,
            Employee,
            EmployeeQuery,
            EmployeeListResponse,
            TimeRecordQuery,
            TimeRecordResponse,
            TimeRecordListResponse
        )
    ),
    tags(
        (name = "Punch", description = "Employee punch terminal"),
        (name = "Company", description = "Company management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "TimeRecord", description = "Attendance records and reports"),
    )
)]
pub struct ApiDoc;
