use crate::error::AppError;
use crate::model::{Consultant, Project, ProjectTemplate, Task, TaskTemplate, TimeEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "snapshot.json";
const STORE_ENV_VAR: &str = "PLANNER_SNAPSHOT_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    schema_version: u32,
    #[serde(default)]
    consultants: Vec<Consultant>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    project_templates: Vec<ProjectTemplate>,
    #[serde(default)]
    task_templates: Vec<TaskTemplate>,
    #[serde(default)]
    time_entries: Vec<TimeEntry>,
}

/// Everything the planner reads, as exported by the persistence service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub consultants: Vec<Consultant>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub project_templates: Vec<ProjectTemplate>,
    pub task_templates: Vec<TaskTemplate>,
    pub time_entries: Vec<TimeEntry>,
}

impl Snapshot {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn project_template(&self, id: &str) -> Option<&ProjectTemplate> {
        self.project_templates
            .iter()
            .find(|template| template.id == id)
    }

    pub fn tasks_for_project(&self, project_id: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect()
    }

    pub fn task_templates_for(&self, template_id: &str) -> Vec<TaskTemplate> {
        self.task_templates
            .iter()
            .filter(|task| task.project_template_id.as_deref() == Some(template_id))
            .cloned()
            .collect()
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("planner").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("planner")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredSnapshot =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let snapshot = Snapshot {
        consultants: stored.consultants,
        projects: stored.projects,
        tasks: stored.tasks,
        project_templates: stored.project_templates,
        task_templates: stored.task_templates,
        time_entries: stored.time_entries,
    };
    check_references(&snapshot)?;

    Ok(snapshot)
}

fn check_references(snapshot: &Snapshot) -> Result<(), AppError> {
    let consultants: HashSet<&str> = snapshot
        .consultants
        .iter()
        .map(|consultant| consultant.id.as_str())
        .collect();
    let projects: HashSet<&str> = snapshot
        .projects
        .iter()
        .map(|project| project.id.as_str())
        .collect();
    let templates: HashSet<&str> = snapshot
        .project_templates
        .iter()
        .map(|template| template.id.as_str())
        .collect();
    let tasks: HashSet<&str> = snapshot.tasks.iter().map(|task| task.id.as_str()).collect();

    for project in &snapshot.projects {
        if project.end_date < project.start_date {
            return Err(AppError::invalid_data(format!(
                "project {} ends on {} before it starts on {}",
                project.id, project.end_date, project.start_date
            )));
        }
    }

    for task in &snapshot.tasks {
        if task.duration_days() < 0 {
            return Err(AppError::invalid_data(format!(
                "task {} ends on {} before it starts on {}",
                task.id, task.end_date, task.start_date
            )));
        }
        if let Some(project_id) = task.project_id.as_deref()
            && !projects.contains(project_id)
        {
            return Err(AppError::invalid_data(format!(
                "task {} references unknown project {project_id}",
                task.id
            )));
        }
        if let Some(consultant_id) = task.consultant_id.as_deref()
            && !consultants.contains(consultant_id)
        {
            return Err(AppError::invalid_data(format!(
                "task {} references unknown consultant {consultant_id}",
                task.id
            )));
        }
    }

    for template in &snapshot.task_templates {
        if let Some(template_id) = template.project_template_id.as_deref()
            && !templates.contains(template_id)
        {
            return Err(AppError::invalid_data(format!(
                "task template {} references unknown project template {template_id}",
                template.id
            )));
        }
    }

    for entry in &snapshot.time_entries {
        if !consultants.contains(entry.consultant_id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "time entry references unknown consultant {}",
                entry.consultant_id
            )));
        }
        if let Some(task_id) = entry.task_id.as_deref()
            && !tasks.contains(task_id)
        {
            return Err(AppError::invalid_data(format!(
                "time entry references unknown task {task_id}"
            )));
        }
    }

    Ok(())
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSnapshot {
        schema_version: SCHEMA_VERSION,
        consultants: snapshot.consultants.clone(),
        projects: snapshot.projects.clone(),
        tasks: snapshot.tasks.clone(),
        project_templates: snapshot.project_templates.clone(),
        task_templates: snapshot.task_templates.clone(),
        time_entries: snapshot.time_entries.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
