//! Demo dataset
//!
//! Loaded into an empty store on first start. Worker user ids match the
//! worker profile ids so that project assignments resolve for a signed-in
//! worker.

use chrono::{DateTime, NaiveDate, Utc};

use crate::material::Material;
use crate::material_request::{MaterialRequest, RequestStatus, Urgency};
use crate::project::{Project, ProjectStatus};
use crate::role::Role;
use crate::supplier::Supplier;
use crate::user::User;
use crate::work_log::WorkLog;
use crate::worker::Worker;

/// Password given to every demo account
pub const DEMO_PASSWORD: &str = "buildtrack-demo";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn timestamp(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    date(y, m, d)
        .and_hms_opt(18, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

pub fn users() -> Vec<User> {
    vec![
        User::new("employer-1", "Ahmad Rahimi", Role::Employer, "ahmad@construction.tj")
            .with_phone("+992 90 100 2000")
            .with_company("Rahimi Construction"),
        User::new("worker-1", "Farid Nazarov", Role::Worker, "farid@worker.tj")
            .with_phone("+992 92 123 4567"),
        User::new("worker-2", "Jamshid Karimov", Role::Worker, "jamshid@worker.tj")
            .with_phone("+992 93 234 5678"),
        User::new("worker-3", "Sanjar Mirzaev", Role::Worker, "sanjar@worker.tj")
            .with_phone("+992 91 345 6789"),
        User::new("worker-4", "Rustam Asadov", Role::Worker, "rustam@worker.tj")
            .with_phone("+992 95 456 7890"),
        User::new("supplier-1", "Gulnora Supply Co.", Role::Supplier, "info@gulnora.tj")
            .with_phone("+992 44 600 7000")
            .with_company("Gulnora Supply Co."),
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "proj-1".into(),
            name: "Residential Complex A".into(),
            description: "Construction of 3-story residential building in Dushanbe".into(),
            status: ProjectStatus::Active,
            total_area: 1200.0,
            completed_area: 780.0,
            budget: 250_000.0,
            spent_amount: 162_500.0,
            start_date: date(2024, 1, 15),
            end_date: date(2024, 6, 30),
            location: "Dushanbe, Tajikistan".into(),
            assigned_workers: vec!["worker-1".into(), "worker-2".into(), "worker-3".into()],
        },
        Project {
            id: "proj-2".into(),
            name: "Office Building B".into(),
            description: "Modern office complex with glass facade".into(),
            status: ProjectStatus::Active,
            total_area: 800.0,
            completed_area: 240.0,
            budget: 180_000.0,
            spent_amount: 54_000.0,
            start_date: date(2024, 2, 1),
            end_date: date(2024, 8, 15),
            location: "Khujand, Tajikistan".into(),
            assigned_workers: vec!["worker-2".into(), "worker-4".into()],
        },
        Project {
            id: "proj-3".into(),
            name: "School Renovation".into(),
            description: "Complete renovation of local school building".into(),
            status: ProjectStatus::Completed,
            total_area: 600.0,
            completed_area: 600.0,
            budget: 120_000.0,
            spent_amount: 118_000.0,
            start_date: date(2023, 10, 1),
            end_date: date(2024, 1, 31),
            location: "Khorog, Tajikistan".into(),
            assigned_workers: vec!["worker-1".into(), "worker-3".into()],
        },
    ]
}

pub fn workers() -> Vec<Worker> {
    let worker = |id: &str, name: &str, specialization: &str, rate: f64, phone: &str, projects: &[&str]| Worker {
        id: id.into(),
        name: name.into(),
        specialization: specialization.into(),
        rate_per_square_meter: rate,
        phone: phone.into(),
        projects_assigned: projects.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        worker("worker-1", "Farid Nazarov", "Mason", 15.0, "+992 92 123 4567", &["proj-1", "proj-3"]),
        worker("worker-2", "Jamshid Karimov", "Carpenter", 18.0, "+992 93 234 5678", &["proj-1", "proj-2"]),
        worker("worker-3", "Sanjar Mirzaev", "Electrician", 20.0, "+992 91 345 6789", &["proj-1", "proj-3"]),
        worker("worker-4", "Rustam Asadov", "Painter", 12.0, "+992 95 456 7890", &["proj-2"]),
    ]
}

pub fn materials() -> Vec<Material> {
    let material = |id: &str, name: &str, unit: &str, total: f64, used: f64, price: f64, supplier: &str, delivered: NaiveDate| Material {
        id: id.into(),
        name: name.into(),
        unit: unit.into(),
        total_quantity: total,
        used_quantity: used,
        remaining_quantity: total - used,
        price_per_unit: price,
        supplier: supplier.into(),
        delivery_date: Some(delivered),
        lock_version: 0,
    };

    vec![
        material("mat-1", "Cement", "kg", 5000.0, 3200.0, 0.8, "Gulnora Supply Co.", date(2024, 1, 10)),
        material("mat-2", "Steel Rebar", "kg", 2000.0, 1300.0, 2.5, "Metallstroy LLC", date(2024, 1, 12)),
        material("mat-3", "Fiberglass", "m²", 800.0, 520.0, 12.0, "Gulnora Supply Co.", date(2024, 1, 15)),
        material("mat-4", "Paint", "L", 300.0, 45.0, 8.0, "ColorMax Trading", date(2024, 2, 1)),
    ]
}

pub fn work_logs() -> Vec<WorkLog> {
    let log = |id: &str, worker_id: &str, worker_name: &str, on: NaiveDate, area: f64, rate: f64, description: &str| WorkLog {
        id: id.into(),
        worker_id: worker_id.into(),
        worker_name: worker_name.into(),
        project_id: "proj-1".into(),
        date: on,
        area_completed: area,
        rate_per_square_meter: rate,
        earnings: area * rate,
        description: description.into(),
        created_at: on.and_hms_opt(18, 0, 0).unwrap_or_default().and_utc(),
    };

    vec![
        log("log-1", "worker-1", "Farid Nazarov", date(2024, 1, 20), 25.0, 15.0,
            "Completed masonry work on ground floor east wall"),
        log("log-2", "worker-2", "Jamshid Karimov", date(2024, 1, 20), 18.0, 18.0,
            "Installed wooden framework for windows"),
        log("log-3", "worker-1", "Farid Nazarov", date(2024, 1, 21), 30.0, 15.0,
            "Continued masonry work on ground floor"),
    ]
}

pub fn suppliers() -> Vec<Supplier> {
    vec![
        Supplier {
            id: "supplier-1".into(),
            name: "Gulnora Supply Co.".into(),
            contact_person: "Gulnora Saidova".into(),
            phone: "+992 44 600 7000".into(),
            email: "info@gulnora.tj".into(),
            materials: vec!["Cement".into(), "Fiberglass".into()],
            user_id: Some("supplier-1".into()),
        },
        Supplier {
            id: "supplier-2".into(),
            name: "Metallstroy LLC".into(),
            contact_person: "Davron Khamidov".into(),
            phone: "+992 44 610 2200".into(),
            email: "sales@metallstroy.tj".into(),
            materials: vec!["Steel Rebar".into()],
            user_id: None,
        },
        Supplier {
            id: "supplier-3".into(),
            name: "ColorMax Trading".into(),
            contact_person: "Nilufar Yusupova".into(),
            phone: "+992 44 620 3300".into(),
            email: "orders@colormax.tj".into(),
            materials: vec!["Paint".into()],
            user_id: None,
        },
    ]
}

pub fn material_requests() -> Vec<MaterialRequest> {
    let base = |id: &str, worker: (&str, &str), project: (&str, &str), material: &str, qty: f64, unit: &str, urgency: Urgency, reason: &str, requested: NaiveDate| MaterialRequest {
        id: id.into(),
        worker_id: worker.0.into(),
        worker_name: worker.1.into(),
        project_id: project.0.into(),
        project_name: project.1.into(),
        material_name: material.into(),
        requested_quantity: qty,
        unit: unit.into(),
        urgency,
        reason: reason.into(),
        notes: None,
        status: RequestStatus::Pending,
        request_date: requested,
        approved_by: None,
        approved_by_id: None,
        approved_date: None,
        fulfilled_date: None,
        rejection_reason: None,
    };

    let farid = ("worker-1", "Farid Nazarov");
    let jamshid = ("worker-2", "Jamshid Karimov");
    let sanjar = ("worker-3", "Sanjar Mirzaev");
    let rustam = ("worker-4", "Rustam Asadov");
    let residential = ("proj-1", "Residential Complex A");
    let office = ("proj-2", "Office Building B");

    let cement = base("req-1", farid, residential, "Cement", 500.0, "kg", Urgency::High,
        "Running low for ground floor masonry", date(2024, 1, 22));

    let mut planks = base("req-2", jamshid, office, "Wood Planks", 120.0, "pcs", Urgency::Medium,
        "Window frames for second floor", date(2024, 1, 18));
    planks.status = RequestStatus::Approved;
    planks.approved_by = Some("Ahmad Rahimi".into());
    planks.approved_by_id = Some("employer-1".into());
    planks.approved_date = Some(date(2024, 1, 19));

    let mut cable = base("req-3", sanjar, residential, "Electrical Cable", 300.0, "m", Urgency::Low,
        "Wiring for the third floor", date(2024, 1, 15));
    cable.status = RequestStatus::Rejected;
    cable.approved_by = Some("Ahmad Rahimi".into());
    cable.approved_by_id = Some("employer-1".into());
    cable.approved_date = Some(date(2024, 1, 16));
    cable.rejection_reason = Some("Enough cable is still on site".into());

    let mut paint = base("req-4", rustam, office, "Paint", 40.0, "L", Urgency::Medium,
        "Interior walls of the lobby", date(2024, 1, 10));
    paint.status = RequestStatus::Fulfilled;
    paint.approved_by = Some("Gulnora Supply Co.".into());
    paint.approved_by_id = Some("supplier-1".into());
    paint.approved_date = Some(date(2024, 1, 11));
    paint.fulfilled_date = Some(date(2024, 1, 13));

    let rebar = base("req-5", jamshid, residential, "Steel Rebar", 200.0, "kg", Urgency::High,
        "Reinforcement for the stairwell", date(2024, 1, 23));

    vec![cement, planks, cable, paint, rebar]
}

/// When the demo dataset was captured; seeded records are stamped with it
pub fn captured_at() -> DateTime<Utc> {
    timestamp(2024, 1, 25)
}
