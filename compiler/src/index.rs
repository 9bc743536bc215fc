use std::collections::HashMap;

use protoxs_descriptor::{EnumSpec, MessageSpec, SchemaSet};

use crate::names;

/// Qualified-name lookup over one schema closure, built once per run and
/// read-only thereafter.  Resolves the type references carried by fields
/// and answers the package-dependent naming questions the emitters ask.
pub struct TypeIndex<'a> {
    messages: HashMap<&'a str, &'a MessageSpec>,
    enums:    HashMap<&'a str, &'a EnumSpec>,
    packages: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> TypeIndex<'a> {
    pub fn build(set: &'a SchemaSet) -> Self {
        let mut index = TypeIndex {
            messages: HashMap::new(),
            enums:    HashMap::new(),
            packages: HashMap::new(),
        };

        for file in &set.files {
            let package = file.package.as_deref();
            for message in &file.messages {
                index.add_message(message, package);
            }
            for enum_spec in &file.enums {
                index.add_enum(enum_spec, package);
            }
        }

        index
    }

    fn add_message(&mut self, message: &'a MessageSpec, package: Option<&'a str>) {
        self.messages.insert(message.qualified.as_str(), message);
        self.packages.insert(message.qualified.as_str(), package);
        for nested in &message.messages {
            self.add_message(nested, package);
        }
        for enum_spec in &message.enums {
            self.add_enum(enum_spec, package);
        }
    }

    fn add_enum(&mut self, enum_spec: &'a EnumSpec, package: Option<&'a str>) {
        self.enums.insert(enum_spec.qualified.as_str(), enum_spec);
        self.packages.insert(enum_spec.qualified.as_str(), package);
    }

    pub fn message(&self, qualified: &str) -> Option<&'a MessageSpec> {
        self.messages.get(qualified).copied()
    }

    pub fn enum_spec(&self, qualified: &str) -> Option<&'a EnumSpec> {
        self.enums.get(qualified).copied()
    }

    pub fn package_of(&self, qualified: &str) -> Option<&'a str> {
        self.packages.get(qualified).copied().flatten()
    }

    pub fn cpp_class(&self, qualified: &str) -> String {
        names::cpp_class_name(self.package_of(qualified), qualified)
    }

    pub fn alias(&self, qualified: &str) -> String {
        names::internal_alias(self.package_of(qualified), qualified)
    }
}
