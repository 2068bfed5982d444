pub mod exam_result_handler;
pub mod health_handler;

use actix_web::web;

pub use exam_result_handler::{
    create_exam_result, delete_exam_result, get_exam_result, get_student_results,
    list_exam_results, preview_grading, record_student_results, remove_student_result,
    set_exam_status, update_exam_result, upsert_student_result,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};

/// Registers every REST route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(create_exam_result)
        .service(list_exam_results)
        .service(get_exam_result)
        .service(update_exam_result)
        .service(delete_exam_result)
        .service(record_student_results)
        .service(upsert_student_result)
        .service(remove_student_result)
        .service(set_exam_status)
        .service(get_student_results)
        .service(preview_grading);
}
