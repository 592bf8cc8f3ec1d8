// teamline-service/src/routes/project_routes.rs
//
// Resource layer: projects, milestones, tasks. Every handler resolves
// the owning team and passes through the authorization gate before
// touching anything; creation and mutation need admin, reads need
// membership.
use crate::models::{
    AccessLevel, Milestone, MilestoneData, MilestoneStatus, MilestoneUpdate, Project, ProjectData,
    ProjectStatus, ProjectUpdate, ServiceError, Task, TaskData, TaskPriority, TaskStatus,
    TaskUpdate,
};
use crate::utils::{get_user_id_from_request, project_storage, team_storage};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use serde_json::json;
use uuid::Uuid;

// --- Projects ---

#[post("/teams/{team_id}/projects")]
async fn create_project(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ProjectData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Admin)?;

    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: data.name.clone(),
        description: data.description.clone(),
        status: ProjectStatus::Active,
        due_date: data.due_date,
        team_id: team.id,
        created_at: Utc::now(),
    };

    project_storage::save_project(&project)?;

    info!("✅ Project created: {} in team: {}", project.id, team_id);

    Ok(HttpResponse::Created().json(project))
}

#[get("/teams/{team_id}/projects")]
async fn get_team_projects(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    team_storage::check_team_access(&team_id, &user_id, AccessLevel::Member)?;

    let projects = project_storage::projects_for_team(&team_id)?;

    Ok(HttpResponse::Ok().json(projects))
}

#[get("/projects/{project_id}")]
async fn get_project(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Member)?;

    let milestones = project_storage::milestones_for_project(&project_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "id": project.id,
        "name": project.name,
        "description": project.description,
        "status": project.status,
        "due_date": project.due_date.map(|d| d.timestamp()),
        "team_id": project.team_id,
        "created_at": project.created_at.timestamp(),
        "milestones": milestones,
    })))
}

#[put("/projects/{project_id}")]
async fn update_project(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ProjectUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let mut project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    if let Some(name) = &data.name {
        project.name = name.clone();
    }
    if let Some(description) = &data.description {
        project.description = Some(description.clone());
    }
    if let Some(status) = data.status {
        project.status = status;
    }
    if let Some(due_date) = data.due_date {
        project.due_date = Some(due_date);
    }

    project_storage::save_project(&project)?;

    Ok(HttpResponse::Ok().json(project))
}

#[delete("/projects/{project_id}")]
async fn delete_project(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    project_storage::delete_project(&project_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// --- Milestones ---

#[post("/projects/{project_id}/milestones")]
async fn create_milestone(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<MilestoneData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    let milestone = Milestone {
        id: Uuid::new_v4().to_string(),
        name: data.name.clone(),
        description: data.description.clone(),
        due_date: data.due_date,
        status: MilestoneStatus::Upcoming,
        project_id: project.id,
    };

    project_storage::save_milestone(&milestone)?;

    Ok(HttpResponse::Created().json(milestone))
}

#[get("/projects/{project_id}/milestones")]
async fn get_project_milestones(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Member)?;

    let milestones = project_storage::milestones_for_project(&project_id)?;

    Ok(HttpResponse::Ok().json(milestones))
}

#[put("/projects/{project_id}/milestones/{milestone_id}")]
async fn update_milestone(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Json<MilestoneUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (project_id, milestone_id) = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    let mut milestone = match project_storage::find_milestone_by_id(&milestone_id)? {
        Some(m) if m.project_id == project_id => m,
        _ => return Err(ServiceError::NotFound),
    };

    if let Some(name) = &data.name {
        milestone.name = name.clone();
    }
    if let Some(description) = &data.description {
        milestone.description = Some(description.clone());
    }
    if let Some(status) = data.status {
        milestone.status = status;
    }
    if let Some(due_date) = data.due_date {
        milestone.due_date = due_date;
    }

    project_storage::save_milestone(&milestone)?;

    Ok(HttpResponse::Ok().json(milestone))
}

#[delete("/projects/{project_id}/milestones/{milestone_id}")]
async fn delete_milestone(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (project_id, milestone_id) = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    match project_storage::find_milestone_by_id(&milestone_id)? {
        Some(m) if m.project_id == project_id => {
            project_storage::delete_milestone(&milestone_id)?;
            Ok(HttpResponse::NoContent().finish())
        }
        _ => Err(ServiceError::NotFound),
    }
}

// --- Tasks ---

#[post("/projects/{project_id}/tasks")]
async fn create_task(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<TaskData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    let task = Task {
        id: Uuid::new_v4().to_string(),
        title: data.title.clone(),
        description: data.description.clone(),
        status: TaskStatus::Todo,
        priority: data.priority.unwrap_or(TaskPriority::Medium),
        due_date: data.due_date,
        assignee_id: data.assignee_id.clone(),
        project_id: project.id,
        created_at: Utc::now(),
    };

    project_storage::save_task(&task)?;

    Ok(HttpResponse::Created().json(task))
}

#[get("/projects/{project_id}/tasks")]
async fn get_project_tasks(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    let project =
        project_storage::find_project_by_id(&project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Member)?;

    let tasks = project_storage::tasks_for_project(&project_id)?;

    Ok(HttpResponse::Ok().json(tasks))
}

#[put("/tasks/{task_id}")]
async fn update_task(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<TaskUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let task_id = path.into_inner();

    let mut task = project_storage::find_task_by_id(&task_id)?.ok_or(ServiceError::NotFound)?;
    let project =
        project_storage::find_project_by_id(&task.project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    if let Some(title) = &data.title {
        task.title = title.clone();
    }
    if let Some(description) = &data.description {
        task.description = Some(description.clone());
    }
    if let Some(status) = data.status {
        task.status = status;
    }
    if let Some(priority) = data.priority {
        task.priority = priority;
    }
    if let Some(due_date) = data.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(assignee_id) = &data.assignee_id {
        task.assignee_id = Some(assignee_id.clone());
    }

    project_storage::save_task(&task)?;

    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{task_id}")]
async fn delete_task(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let task_id = path.into_inner();

    let task = project_storage::find_task_by_id(&task_id)?.ok_or(ServiceError::NotFound)?;
    let project =
        project_storage::find_project_by_id(&task.project_id)?.ok_or(ServiceError::NotFound)?;
    team_storage::check_team_access(&project.team_id, &user_id, AccessLevel::Admin)?;

    project_storage::delete_task(&task_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// Register all project routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_project)
        .service(get_team_projects)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(create_milestone)
        .service(get_project_milestones)
        .service(update_milestone)
        .service(delete_milestone)
        .service(create_task)
        .service(get_project_tasks)
        .service(update_task)
        .service(delete_task);
}
