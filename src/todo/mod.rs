use crate::auth::Identity;
use crate::crud::{CrudEntity, CrudResource};
use crate::database::models::Todo;
use crate::database::Repository;

pub mod dto;

pub use dto::{CreateTodoDto, UpdateTodoDto};

pub type TodoStore = Repository<Todo>;
pub type TodoResource = CrudResource<Todo, CreateTodoDto, UpdateTodoDto, TodoStore>;

pub const PREFIX: &str = "/todo";

impl CrudEntity<CreateTodoDto, UpdateTodoDto> for Todo {
    fn from_create(dto: CreateTodoDto, owner: &Identity) -> Self {
        Todo::new(owner.id.as_str(), dto.title, dto.description)
    }

    fn apply_update(&mut self, dto: UpdateTodoDto) {
        self.title = dto.title;
        self.description = dto.description;
        self.touch();
    }
}
