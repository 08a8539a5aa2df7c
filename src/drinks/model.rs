//! Drink records and their JSON shapes

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// One recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Ingredient as shown in the public listing, without its name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// A stored drink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public representation of a drink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl Drink {
    /// Short form: recipe reduced to colors and parts
    pub fn short(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }

    /// Long form: the full recipe
    pub fn long(&self) -> &Drink {
        self
    }
}

/// A recipe may be posted as one ingredient or a list of them
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl RecipeInput {
    fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::One(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

/// Request body for creating or updating a drink
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// Validated input for a new drink
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Validated changes to an existing drink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

fn validate_title(title: String) -> Result<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    Ok(title)
}

fn validate_recipe(recipe: RecipeInput) -> Result<Vec<Ingredient>> {
    let ingredients = recipe.into_ingredients();
    if ingredients.is_empty() {
        return Err(ApiError::BadRequest("recipe must list at least one ingredient".to_string()));
    }
    if let Some(bad) = ingredients.iter().find(|i| i.name.trim().is_empty() || i.color.trim().is_empty()) {
        return Err(ApiError::BadRequest(format!(
            "ingredient {:?} needs a name and a color",
            bad.name
        )));
    }
    if ingredients.iter().any(|i| i.parts == 0) {
        return Err(ApiError::BadRequest("ingredient parts must be positive".to_string()));
    }
    Ok(ingredients)
}

impl DrinkPayload {
    /// Validate a creation request: both fields required
    pub fn into_new_drink(self) -> Result<NewDrink> {
        let title = self
            .title
            .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;
        let recipe = self
            .recipe
            .ok_or_else(|| ApiError::BadRequest("recipe is required".to_string()))?;

        Ok(NewDrink {
            title: validate_title(title)?,
            recipe: validate_recipe(recipe)?,
        })
    }

    /// Validate an update request: at least one field
    pub fn into_changes(self) -> Result<DrinkChanges> {
        if self.title.is_none() && self.recipe.is_none() {
            return Err(ApiError::BadRequest("nothing to update".to_string()));
        }
        Ok(DrinkChanges {
            title: self.title.map(validate_title).transpose()?,
            recipe: self.recipe.map(validate_recipe).transpose()?,
        })
    }
}
