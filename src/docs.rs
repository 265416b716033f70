use crate::api::attendance::{EditScan, SubmitScan};
use crate::api::vacation::{CreateVacation, ReviewBody, VacationFilter, VacationListResponse};
use crate::engine::daily::{GroupDayStats, MemberDay, StatusCounts};
use crate::engine::range::{DayPoint, RangeStats, UserRangeSummary};
use crate::model::group::GroupWorkSettings;
use crate::model::scan_event::ScanEvent;
use crate::model::status::{DailyRecord, DailyStatus, DataAnomaly};
use crate::model::vacation::VacationRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QR Attendance API",
        version = "1.0.0",
        description = r#"
## QR-based Attendance Tracker

Users scan location-bound QR codes to log check-in/check-out events. The
engine classifies each user-day into a single status, rolls statuses up into
group statistics, and reconciles approved vacation periods against
attendance.

### Key Features
- **Scan submission**
  - Session-token and bare-location QR payloads, geolocation required
- **Classification**
  - One status per user-day: present / late / checkout / early_leave / absent / vacation
  - Approved vacation always wins; day bucketing fixed to UTC+9
- **Dashboards**
  - Daily, arbitrary-range and group-week statistics with per-member detail
- **Vacation workflow**
  - Request, approve/reject with reviewer comments

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit_scan,
        crate::api::attendance::edit_scan,
        crate::api::attendance::delete_scan,

        crate::api::vacation::vacation_list,
        crate::api::vacation::get_vacation,
        crate::api::vacation::create_vacation,
        crate::api::vacation::approve_vacation,
        crate::api::vacation::reject_vacation,

        crate::api::stats::group_daily,
        crate::api::stats::group_range,
        crate::api::stats::group_week,
        crate::api::stats::user_daily,

        crate::api::settings::get_settings,
        crate::api::settings::put_settings,
    ),
    components(
        schemas(
            SubmitScan,
            EditScan,
            ScanEvent,
            CreateVacation,
            ReviewBody,
            VacationFilter,
            VacationListResponse,
            VacationRequest,
            GroupWorkSettings,
            DailyStatus,
            DataAnomaly,
            DailyRecord,
            StatusCounts,
            MemberDay,
            GroupDayStats,
            DayPoint,
            UserRangeSummary,
            RangeStats,
        )
    ),
    tags(
        (name = "Attendance", description = "Scan submission and record maintenance APIs"),
        (name = "Vacation", description = "Vacation request workflow APIs"),
        (name = "Stats", description = "Dashboard aggregation APIs"),
        (name = "Settings", description = "Group work-time configuration APIs"),
    )
)]
pub struct ApiDoc;
