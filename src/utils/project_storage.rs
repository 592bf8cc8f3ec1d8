// teamline-service/src/utils/project_storage.rs
//
// Resource-layer storage: projects, milestones, tasks. No transition
// logic lives here; every caller has already passed the authorization
// gate for the owning team.
use crate::models::{Milestone, Project, ServiceError, Task};
use crate::utils::storage;
use log::info;
use std::path::PathBuf;

fn project_path(project_id: &str) -> PathBuf {
    storage::dir("projects").join(format!("{}.json", project_id))
}

fn milestone_path(milestone_id: &str) -> PathBuf {
    storage::dir("milestones").join(format!("{}.json", milestone_id))
}

fn task_path(task_id: &str) -> PathBuf {
    storage::dir("tasks").join(format!("{}.json", task_id))
}

// --- Projects ---

pub fn save_project(project: &Project) -> Result<(), ServiceError> {
    storage::write_json(&project_path(&project.id), project)
}

pub fn find_project_by_id(project_id: &str) -> Result<Option<Project>, ServiceError> {
    storage::read_json(&project_path(project_id))
}

pub fn projects_for_team(team_id: &str) -> Result<Vec<Project>, ServiceError> {
    let projects: Vec<Project> = storage::scan(&storage::dir("projects"))?;
    Ok(projects
        .into_iter()
        .filter(|p| p.team_id == team_id)
        .collect())
}

// Delete a project and its milestones and tasks
pub fn delete_project(project_id: &str) -> Result<bool, ServiceError> {
    for milestone in milestones_for_project(project_id)? {
        storage::remove_json(&milestone_path(&milestone.id))?;
    }
    for task in tasks_for_project(project_id)? {
        storage::remove_json(&task_path(&task.id))?;
    }

    let deleted = storage::remove_json(&project_path(project_id))?;
    if deleted {
        info!("✅ Project deleted: {}", project_id);
    }
    Ok(deleted)
}

// Cascade for team deletion
pub fn delete_team_projects(team_id: &str) -> Result<usize, ServiceError> {
    let projects = projects_for_team(team_id)?;
    let mut deleted = 0;

    for project in projects {
        if delete_project(&project.id)? {
            deleted += 1;
        }
    }

    info!("✅ Deleted {} projects for team: {}", deleted, team_id);
    Ok(deleted)
}

// --- Milestones ---

pub fn save_milestone(milestone: &Milestone) -> Result<(), ServiceError> {
    storage::write_json(&milestone_path(&milestone.id), milestone)
}

pub fn find_milestone_by_id(milestone_id: &str) -> Result<Option<Milestone>, ServiceError> {
    storage::read_json(&milestone_path(milestone_id))
}

pub fn milestones_for_project(project_id: &str) -> Result<Vec<Milestone>, ServiceError> {
    let milestones: Vec<Milestone> = storage::scan(&storage::dir("milestones"))?;
    Ok(milestones
        .into_iter()
        .filter(|m| m.project_id == project_id)
        .collect())
}

pub fn delete_milestone(milestone_id: &str) -> Result<bool, ServiceError> {
    storage::remove_json(&milestone_path(milestone_id))
}

// --- Tasks ---

pub fn save_task(task: &Task) -> Result<(), ServiceError> {
    storage::write_json(&task_path(&task.id), task)
}

pub fn find_task_by_id(task_id: &str) -> Result<Option<Task>, ServiceError> {
    storage::read_json(&task_path(task_id))
}

pub fn tasks_for_project(project_id: &str) -> Result<Vec<Task>, ServiceError> {
    let tasks: Vec<Task> = storage::scan(&storage::dir("tasks"))?;
    Ok(tasks
        .into_iter()
        .filter(|t| t.project_id == project_id)
        .collect())
}

pub fn delete_task(task_id: &str) -> Result<bool, ServiceError> {
    storage::remove_json(&task_path(task_id))
}
