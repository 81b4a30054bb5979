use chrono::NaiveDate;

use crate::domain::error::ValidationError;
use crate::domain::todo::{Category, CategoryId, Todo, TodoDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField { #[default] Title, Description, Category, Due }

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Category,
            FormField::Category => FormField::Due,
            FormField::Due => FormField::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Desc",
            FormField::Category => "Category",
            FormField::Due => "Due (YYYY-MM-DD)",
        }
    }
}

/// Raw input of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub field: FormField,
    pub title: String,
    pub description: String,
    pub category: Option<CategoryId>,
    pub due_date_text: String,
}

impl TodoForm {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            field: FormField::Title,
            title: todo.title.clone(),
            description: todo.description.clone(),
            category: todo.category_id(),
            due_date_text: todo.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        }
    }

    /// Text buffer for the focused field; the category field has none.
    pub fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Due => Some(&mut self.due_date_text),
            FormField::Category => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buf) = self.active_text_mut() { buf.push(c); }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = self.active_text_mut() { buf.pop(); }
    }

    /// Steps through "no category" followed by each category in list order.
    pub fn cycle_category(&mut self, categories: &[Category], forward: bool) {
        if categories.is_empty() {
            self.category = None;
            return;
        }
        // slot 0 is "none", slot i+1 is categories[i]
        let slots = categories.len() + 1;
        let current = self
            .category
            .and_then(|id| categories.iter().position(|c| c.id == id))
            .map_or(0, |i| i + 1);
        let next = if forward { (current + 1) % slots } else { (current + slots - 1) % slots };
        self.category = if next == 0 { None } else { Some(categories[next - 1].id) };
    }

    pub fn category_name<'a>(&self, categories: &'a [Category]) -> Option<&'a str> {
        let id = self.category?;
        categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    pub fn to_draft(&self) -> Result<TodoDraft, ValidationError> {
        let due = self.due_date_text.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            Some(NaiveDate::parse_from_str(due, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDueDate(due.to_string()))?)
        };
        let draft = TodoDraft {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            category_id: self.category,
            due_date,
        };
        draft.validate()?;
        Ok(draft)
    }
}
