pub mod alerts;
mod commands;
pub mod csv_io;
pub mod datetext;
pub mod db;
mod state;
pub mod task_parser;
pub mod types;

use std::sync::Arc;

use tauri::Manager;

use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            app.manage(Arc::new(AppState::new()));
            log::info!("Rolodex ready");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::list_companies,
            commands::create_company,
            commands::update_company,
            commands::delete_company,
            commands::log_company_contact,
            commands::list_people,
            commands::create_person,
            commands::assign_person_company,
            commands::delete_person,
            commands::list_activities,
            commands::create_activity,
            commands::set_activity_completed,
            commands::reschedule_activity,
            commands::link_activity_company,
            commands::delete_activity,
            commands::preview_task_input,
            commands::create_task_from_input,
            commands::parse_date_input,
            commands::company_alerts,
            commands::all_company_alerts,
            commands::export_companies_csv,
            commands::import_companies_csv,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
