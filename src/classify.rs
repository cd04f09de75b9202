//! Stereotype assignment and compartment labels for class boxes.

use crate::ir::{ClassRecord, Stereotype, Visibility};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLine {
    pub text: String,
    /// Draw a compartment rule under this line.
    pub divider_after: bool,
}

/// Label of a class box: stereotype marker, name, fields pane, methods pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassLabel {
    pub lines: Vec<LabelLine>,
}

impl ClassLabel {
    fn push(&mut self, text: String) {
        self.lines.push(LabelLine {
            text,
            divider_after: false,
        });
    }

    fn close_pane(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            last.divider_after = true;
        }
    }

    /// Line count and longest line length in characters.
    pub fn metrics(&self) -> (usize, usize) {
        self.lines.iter().fold((0, 0), |(count, longest), line| {
            (count + 1, longest.max(line.text.chars().count()))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedClass {
    pub name: String,
    pub stereotype: Stereotype,
    pub label: ClassLabel,
}

pub fn classify(class: &ClassRecord) -> Stereotype {
    if !class.has_constructor() && !class.has_method() {
        return Stereotype::Datatype;
    }

    let only_public_methods = !class.methods.public.is_empty()
        && class.methods.private.is_empty()
        && class.methods.protected.is_empty();

    if !class.has_constructor()
        && !class.has_field()
        && !class.has_destructor
        && only_public_methods
        && class.methods.public.iter().all(|method| method.pure_virtual)
    {
        return Stereotype::Interface;
    }

    // Abstract has no assignment rule yet.
    Stereotype::None
}

pub fn class_label(class: &ClassRecord, stereotype: Stereotype) -> ClassLabel {
    let mut label = ClassLabel::default();
    if let Some(marker) = stereotype.marker() {
        label.push(marker.to_string());
    }
    label.push(class.name.clone());

    if class.has_field() || class.has_method() {
        label.close_pane();
    }

    for (visibility, field) in class.fields.iter() {
        label.push(member_line(visibility, field));
    }

    if class.has_method() {
        label.close_pane();
        for (visibility, method) in class.methods.iter() {
            label.push(member_line(visibility, &method.signature));
        }
    }

    label
}

pub fn classify_class(class: &ClassRecord) -> ClassifiedClass {
    let stereotype = classify(class);
    ClassifiedClass {
        name: class.name.clone(),
        stereotype,
        label: class_label(class, stereotype),
    }
}

fn member_line(visibility: Visibility, text: &str) -> String {
    format!("{} {}", visibility.prefix(), text)
}
