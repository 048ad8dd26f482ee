//! Admin-editable records and their forms

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::store::Collection;
use crate::{Category, Money, Product, Result, StorefrontError, Testimonial};

/// Raw submitted form fields, in arrival order. Repeated names are allowed.
pub type FormFields = Vec<(String, String)>;

/// Whether submitted fields create a record or replace an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// A record managed through the back-office editors.
pub trait AdminEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    type Form: Validate + Clone + Default + Send + Sync;

    fn id(&self) -> &str;
    fn image(&self) -> &str;
    fn set_image(&mut self, url: String);
    fn matches_search(&self, term: &str) -> bool;

    /// Form pre-filled from this record.
    fn to_form(&self) -> Self::Form;
    /// Image reference already present in the form (kept when no file is chosen).
    fn form_image(form: &Self::Form) -> &str;
    fn form_from_fields(fields: &FormFields, mode: FormMode) -> Self::Form;
    /// Checks beyond required fields.
    fn check_form(_form: &Self::Form) -> Result<()> { Ok(()) }
    fn from_form(id: String, form: &Self::Form, existing: Option<&Self>) -> Result<Self>;
}

/// Runs every local check. Nothing here touches a store.
pub fn validate_form<E: AdminEntity>(form: &E::Form) -> Result<()> {
    form.validate().map_err(missing_fields_message)?;
    E::check_form(form)
}

fn missing_fields_message(errors: ValidationErrors) -> StorefrontError {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    StorefrontError::Validation(format!(
        "Por favor complete todos los campos obligatorios ({})",
        fields.join(", ")
    ))
}

fn field(fields: &FormFields, name: &str) -> String {
    fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()).unwrap_or_default()
}

/// The last occurrence wins, so a hidden `false` input may precede a checkbox.
fn flag(fields: &FormFields, name: &str, default: bool) -> bool {
    match fields.iter().rev().find(|(k, _)| k == name) {
        Some((_, v)) => matches!(v.trim().to_lowercase().as_str(), "true" | "on" | "1" | "yes"),
        None => default,
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub precio: String,
    #[validate(length(min = 1))]
    pub descripcion: String,
    #[serde(default)]
    pub imagen: String,
    #[serde(default = "default_stock")]
    pub stock: bool,
    #[serde(default)]
    pub categorias: Vec<String>,
}

fn default_stock() -> bool { true }

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            nombre: String::new(), precio: String::new(), descripcion: String::new(),
            imagen: String::new(), stock: true, categorias: Vec::new(),
        }
    }
}

impl ProductForm {
    pub fn toggle_category(&mut self, category_id: &str) {
        match self.categorias.iter().position(|c| c == category_id) {
            Some(idx) => { self.categorias.remove(idx); }
            None => self.categorias.push(category_id.to_string()),
        }
    }

    fn parsed_price(&self) -> Result<Money> {
        let price = Money::parse(&self.precio)
            .ok_or_else(|| StorefrontError::Validation(format!("Precio inválido: '{}'", self.precio)))?;
        if price.is_negative() {
            return Err(StorefrontError::Validation("El precio no puede ser negativo".to_string()));
        }
        Ok(price)
    }
}

impl AdminEntity for Product {
    const COLLECTION: Collection = Collection::Products;
    type Form = ProductForm;

    fn id(&self) -> &str { &self.id }
    fn image(&self) -> &str { &self.image }
    fn set_image(&mut self, url: String) { self.image = url; }
    fn matches_search(&self, term: &str) -> bool { Product::matches_search(self, term) }

    fn to_form(&self) -> ProductForm {
        ProductForm {
            nombre: self.name.clone(),
            precio: self.price.amount().to_string(),
            descripcion: self.description.clone(),
            imagen: self.image.clone(),
            stock: self.stock,
            categorias: self.categories.clone(),
        }
    }

    fn form_image(form: &ProductForm) -> &str { &form.imagen }

    /// Browsers omit unchecked checkboxes, so an edit without `stock` marks the
    /// product out of stock. New products default to in stock.
    fn form_from_fields(fields: &FormFields, mode: FormMode) -> ProductForm {
        ProductForm {
            nombre: field(fields, "nombre"),
            precio: field(fields, "precio"),
            descripcion: field(fields, "descripcion"),
            imagen: field(fields, "imagen"),
            stock: flag(fields, "stock", mode == FormMode::Create),
            categorias: fields
                .iter()
                .filter(|(k, v)| k == "categorias" && !v.is_empty())
                .map(|(_, v)| v.clone())
                .collect(),
        }
    }

    fn check_form(form: &ProductForm) -> Result<()> { form.parsed_price().map(|_| ()) }

    fn from_form(id: String, form: &ProductForm, _existing: Option<&Self>) -> Result<Self> {
        Ok(Product {
            id,
            name: form.nombre.clone(),
            price: form.parsed_price()?,
            description: form.descripcion.clone(),
            image: form.imagen.clone(),
            stock: form.stock,
            categories: form.categorias.clone(),
        })
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[serde(default)]
    pub imagen: String,
}

impl AdminEntity for Category {
    const COLLECTION: Collection = Collection::Categories;
    type Form = CategoryForm;

    fn id(&self) -> &str { &self.id }
    fn image(&self) -> &str { &self.image }
    fn set_image(&mut self, url: String) { self.image = url; }
    fn matches_search(&self, term: &str) -> bool { Category::matches_search(self, term) }

    fn to_form(&self) -> CategoryForm { CategoryForm { nombre: self.name.clone(), imagen: self.image.clone() } }
    fn form_image(form: &CategoryForm) -> &str { &form.imagen }

    fn form_from_fields(fields: &FormFields, _mode: FormMode) -> CategoryForm {
        CategoryForm { nombre: field(fields, "nombre"), imagen: field(fields, "imagen") }
    }

    fn from_form(id: String, form: &CategoryForm, _existing: Option<&Self>) -> Result<Self> {
        Ok(Category { id, name: form.nombre.clone(), image: form.imagen.clone() })
    }
}

// =============================================================================
// Testimonials
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct TestimonialForm {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub comentario: String,
    #[serde(default)]
    pub imagen: String,
}

impl AdminEntity for Testimonial {
    const COLLECTION: Collection = Collection::Testimonials;
    type Form = TestimonialForm;

    fn id(&self) -> &str { &self.id }
    fn image(&self) -> &str { &self.image }
    fn set_image(&mut self, url: String) { self.image = url; }
    fn matches_search(&self, term: &str) -> bool { Testimonial::matches_search(self, term) }

    fn to_form(&self) -> TestimonialForm {
        TestimonialForm { nombre: self.author.clone(), comentario: self.comment.clone(), imagen: self.image.clone() }
    }

    fn form_image(form: &TestimonialForm) -> &str { &form.imagen }

    fn form_from_fields(fields: &FormFields, _mode: FormMode) -> TestimonialForm {
        TestimonialForm {
            nombre: field(fields, "nombre"),
            comentario: field(fields, "comentario"),
            imagen: field(fields, "imagen"),
        }
    }

    fn from_form(id: String, form: &TestimonialForm, existing: Option<&Self>) -> Result<Self> {
        Ok(Testimonial {
            id,
            author: form.nombre.clone(),
            comment: form.comentario.clone(),
            image: form.imagen.clone(),
            created_at: existing.map(|t| t.created_at).unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_product_form_requires_fields() {
        let form = ProductForm { nombre: "Vestido".into(), ..Default::default() };
        let err = validate_form::<Product>(&form).unwrap_err();
        match err {
            StorefrontError::Validation(msg) => {
                assert!(msg.contains("descripcion"));
                assert!(msg.contains("precio"));
                assert!(!msg.contains("nombre"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_product_price_checks() {
        let mut form = ProductForm {
            nombre: "Vestido".into(), precio: "abc".into(), descripcion: "Largo".into(), ..Default::default()
        };
        assert!(validate_form::<Product>(&form).is_err());
        form.precio = "-5".into();
        assert!(validate_form::<Product>(&form).is_err());
        form.precio = "4500".into();
        assert!(validate_form::<Product>(&form).is_ok());
        let p = Product::from_form("p1".into(), &form, None).unwrap();
        assert_eq!(p.price, Money::from_units(4500));
        assert!(p.stock);
    }

    #[test]
    fn test_product_form_from_fields() {
        let form = Product::form_from_fields(
            &fields(&[
                ("nombre", "Remera"), ("precio", "1200"), ("descripcion", "Algodón"),
                ("stock", "false"), ("categorias", "A"), ("categorias", "B"), ("categorias", ""),
            ]),
            FormMode::Create,
        );
        assert_eq!(form.categorias, vec!["A".to_string(), "B".to_string()]);
        assert!(!form.stock);
        assert!(Product::form_from_fields(&fields(&[]), FormMode::Create).stock);
    }

    #[test]
    fn test_unchecked_stock_box_on_edit_means_out_of_stock() {
        assert!(!Product::form_from_fields(&fields(&[("nombre", "Remera")]), FormMode::Update).stock);
        assert!(Product::form_from_fields(&fields(&[("stock", "on")]), FormMode::Update).stock);
        let hidden_then_checked = fields(&[("stock", "false"), ("stock", "on")]);
        assert!(Product::form_from_fields(&hidden_then_checked, FormMode::Create).stock);
        assert!(!Product::form_from_fields(&fields(&[("stock", "false")]), FormMode::Create).stock);
    }

    #[test]
    fn test_toggle_category_in_form() {
        let mut form = ProductForm::default();
        form.toggle_category("A");
        form.toggle_category("B");
        form.toggle_category("A");
        assert_eq!(form.categorias, vec!["B".to_string()]);
    }

    #[test]
    fn test_testimonial_edit_keeps_timestamp() {
        let original = Testimonial {
            id: "t1".into(), author: "Ana".into(), comment: "Hermoso".into(), image: String::new(),
            created_at: Utc::now() - chrono::Duration::days(30),
        };
        let mut form = original.to_form();
        form.comentario = "Hermoso, volveré".into();
        let edited = Testimonial::from_form("t1".into(), &form, Some(&original)).unwrap();
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.comment, "Hermoso, volveré");
    }

    #[test]
    fn test_category_requires_name() {
        assert!(validate_form::<Category>(&CategoryForm::default()).is_err());
        assert!(validate_form::<Category>(&CategoryForm { nombre: "Vestidos".into(), imagen: String::new() }).is_ok());
    }
}
