use crate::api::absence::{AbsenceFilter, AbsenceListResponse, CreateAbsence};
use crate::api::cash::{CashFilter, CashListResponse, DisputeCash};
use crate::api::client::{ClientListResponse, CreateClient};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::job::{CompleteJob, CreateJob, JobFilter, JobListResponse, RescheduleJob};
use crate::api::payroll::{
    GeneratePayroll, MarkPaid, PeriodDetailResponse, PeriodListResponse, PeriodQuery,
    PeriodReminder,
};
use crate::api::schedule::{
    AssignmentRequest, AvailableCleaner, AvailableCleanersQuery, AvailableCleanersResponse,
};
use crate::api::tax_config::{TaxConfigurationResponse, UpsertTaxConfiguration};
use crate::core::schedule::ValidationOutcome;
use crate::model::absence_request::AbsenceRequest;
use crate::model::cash_collection::CashCollection;
use crate::model::client::Client;
use crate::model::employee::Employee;
use crate::model::job::Job;
use crate::model::payroll::{PayrollEntry, PayrollPeriod};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CleanOps API",
        version = "1.0.0",
        description = r#"
## Cleaning-Services Operations API

Back office for a multi-tenant cleaning-services company: clients, cleaners,
job scheduling with conflict validation, absence requests, payroll generation,
and cash-handling reconciliation.

### Key Features
- **Scheduling**
  - Conflict-checked job booking, rescheduling, availability pickers
- **Absence Management**
  - Cleaner self-service requests, office approval/rejection
- **Payroll**
  - Period generation from completed jobs with simplified statutory deductions
  - Approval and payment lifecycle (pending -> approved -> paid)
- **Cash Handling**
  - Disposition tracking for cash collected on-site and its compensation workflow

### Security
Endpoints are protected with **JWT Bearer authentication**; tokens are issued
by the external identity service. All data is scoped to the caller's tenant.

### Disclaimer
The payroll deduction model is deliberately simplified and is **not** a
compliant tax calculation.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::client::create_client,
        crate::api::client::list_clients,
        crate::api::client::get_client,
        crate::api::client::update_client,
        crate::api::client::delete_client,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::job::create_job,
        crate::api::job::list_jobs,
        crate::api::job::get_job,
        crate::api::job::reschedule_job,
        crate::api::job::cancel_job,
        crate::api::job::complete_job,

        crate::api::schedule::validate,
        crate::api::schedule::available_cleaners,

        crate::api::absence::absence_list,
        crate::api::absence::get_absence,
        crate::api::absence::create_absence,
        crate::api::absence::approve_absence,
        crate::api::absence::reject_absence,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::list_periods,
        crate::api::payroll::get_period,
        crate::api::payroll::approve_period,
        crate::api::payroll::mark_paid,
        crate::api::payroll::period_reminder,

        crate::api::cash::cash_list,
        crate::api::cash::get_cash,
        crate::api::cash::approve_cash,
        crate::api::cash::dispute_cash,

        crate::api::tax_config::get_tax_config,
        crate::api::tax_config::upsert_tax_config
    ),
    components(
        schemas(
            Client,
            CreateClient,
            ClientListResponse,
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            Job,
            CreateJob,
            RescheduleJob,
            CompleteJob,
            JobFilter,
            JobListResponse,
            AssignmentRequest,
            AvailableCleaner,
            AvailableCleanersQuery,
            AvailableCleanersResponse,
            ValidationOutcome,
            AbsenceRequest,
            CreateAbsence,
            AbsenceFilter,
            AbsenceListResponse,
            PayrollPeriod,
            PayrollEntry,
            GeneratePayroll,
            MarkPaid,
            PeriodQuery,
            PeriodListResponse,
            PeriodDetailResponse,
            PeriodReminder,
            CashCollection,
            CashFilter,
            CashListResponse,
            DisputeCash,
            TaxConfigurationResponse,
            UpsertTaxConfiguration
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Client", description = "Client management APIs"),
        (name = "Employee", description = "Cleaner management APIs"),
        (name = "Job", description = "Job scheduling APIs"),
        (name = "Schedule", description = "Conflict validation and availability APIs"),
        (name = "Absence", description = "Absence request APIs"),
        (name = "Payroll", description = "Payroll period APIs"),
        (name = "Cash", description = "Cash handling APIs"),
        (name = "TaxConfig", description = "Deduction rate configuration APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
