//! Declaration-level conversion behavior.

use smallvec::SmallVec;
use vbcs_common::NodeId;
use vbcs_convert::Converter;
use vbcs_semantic::TableContext;
use vbcs_syntax::{cs, vb};

fn nid(n: u32) -> NodeId {
    NodeId(n)
}

fn e(n: u32, kind: vb::ExprKind) -> vb::Expr {
    vb::Expr::new(nid(n), kind)
}

fn predefined(n: u32, ty: vb::PredefinedTy) -> vb::TypeRef {
    vb::TypeRef {
        id: nid(n),
        kind: vb::TypeKind::Predefined(ty),
    }
}

fn simple_as(n: u32, ty: vb::PredefinedTy) -> vb::TypedAs {
    vb::TypedAs::Simple(vb::AsClause {
        attributes: vec![],
        ty: predefined(n, ty),
    })
}

fn declarator(names: &[&str], as_clause: Option<vb::TypedAs>) -> vb::VariableDeclarator {
    vb::VariableDeclarator {
        names: names
            .iter()
            .map(|text| vb::DeclaratorName {
                ident: vb::Ident::new(*text),
                nullable: false,
                array_ranks: SmallVec::new(),
            })
            .collect(),
        as_clause,
        initializer: None,
    }
}

fn parameter(n: u32, name: &str, as_clause: Option<vb::TypeRef>) -> vb::Parameter {
    vb::Parameter {
        id: nid(n),
        attributes: vec![],
        modifiers: vec![],
        ident: vb::Ident::new(name),
        nullable: false,
        array_ranks: SmallVec::new(),
        as_clause,
        default: None,
    }
}

fn class_with(n: u32, name: &str, members: Vec<vb::Decl>) -> vb::Decl {
    vb::Decl {
        id: nid(n),
        kind: vb::DeclKind::TypeBlock {
            kind: vb::TypeBlockKind::Class,
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new(name),
            type_params: None,
            inherits: vec![],
            implements: vec![],
            members,
        },
    }
}

fn type_members(converted: &cs::MemberDecl) -> &[cs::MemberDecl] {
    match converted {
        cs::MemberDecl::Type { members, .. } => members,
        other => panic!("expected type declaration, got {other:?}"),
    }
}

#[test]
fn multi_declarator_field_splits_per_name() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Field {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Private],
            declarators: vec![
                declarator(&["a", "b"], Some(simple_as(2, vb::PredefinedTy::Integer))),
                declarator(&["c"], Some(simple_as(3, vb::PredefinedTy::String))),
            ],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    assert_eq!(converted.auxiliary.len(), 2);
    let names: Vec<&str> = std::iter::once(&converted.primary)
        .chain(&converted.auxiliary)
        .map(|m| m.name().unwrap())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
    match &converted.primary {
        cs::MemberDecl::Field { ty, modifiers, .. } => {
            assert_eq!(ty.to_string(), "int");
            assert_eq!(modifiers, &[cs::Modifier::Private]);
        }
        other => panic!("expected field, got {other:?}"),
    }
    match &converted.auxiliary[1] {
        cs::MemberDecl::Field { ty, .. } => assert_eq!(ty.to_string(), "string"),
        other => panic!("expected field, got {other:?}"),
    }
}

#[test]
fn with_events_is_dropped_with_a_marker() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Field {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Private, vb::Modifier::WithEvents],
            declarators: vec![declarator(&["button"], Some(simple_as(2, vb::PredefinedTy::Object)))],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Field {
            trailing_comment: Some(comment),
            ..
        } => assert!(comment.contains("WithEvents"), "comment was {comment:?}"),
        other => panic!("expected marked field, got {other:?}"),
    }
}

#[test]
fn event_without_as_clause_synthesizes_a_delegate() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Event {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Progress"),
            parameters: vec![parameter(
                2,
                "percent",
                Some(predefined(3, vb::PredefinedTy::Integer)),
            )],
            as_clause: None,
            accessors: None,
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::EventField { ty, name, .. } => {
            assert_eq!(name, "Progress");
            assert_eq!(ty.to_string(), "ProgressHandler");
        }
        other => panic!("expected field-like event, got {other:?}"),
    }
    assert_eq!(converted.auxiliary.len(), 1);
    match &converted.auxiliary[0] {
        cs::MemberDecl::Delegate {
            name,
            return_type,
            parameters,
            ..
        } => {
            assert_eq!(name, "ProgressHandler");
            assert_eq!(return_type.to_string(), "void");
            assert_eq!(parameters.len(), 1);
            assert_eq!(parameters[0].ty.as_ref().unwrap().to_string(), "int");
        }
        other => panic!("expected delegate, got {other:?}"),
    }
}

#[test]
fn event_with_as_clause_stays_field_like() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Event {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Changed"),
            parameters: vec![],
            as_clause: Some(vb::AsClause {
                attributes: vec![],
                ty: vb::TypeRef {
                    id: nid(2),
                    kind: vb::TypeKind::Name(vb::NameRef::identifier(nid(3), "EventHandler")),
                },
            }),
            accessors: None,
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    assert!(converted.auxiliary.is_empty());
    match &converted.primary {
        cs::MemberDecl::EventField { ty, .. } => assert_eq!(ty.to_string(), "EventHandler"),
        other => panic!("expected field-like event, got {other:?}"),
    }
}

#[test]
fn module_becomes_a_static_class() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::TypeBlock {
            kind: vb::TypeBlockKind::Module,
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Utilities"),
            type_params: None,
            inherits: vec![],
            implements: vec![],
            members: vec![],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Type {
            kind, modifiers, ..
        } => {
            assert_eq!(*kind, cs::TypeDeclKind::Class);
            assert!(modifiers.contains(&cs::Modifier::Static));
        }
        other => panic!("expected class, got {other:?}"),
    }
}

#[test]
fn finalize_with_overrides_becomes_a_destructor() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let finalize = vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Method {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Protected, vb::Modifier::Overrides],
            is_function: false,
            ident: vb::Ident::new("Finalize"),
            type_params: None,
            parameters: vec![],
            as_clause: None,
            body: Some(vec![]),
        },
    };
    let converted = conv
        .convert_decl(&class_with(1, "Resource", vec![finalize]))
        .unwrap();
    match &type_members(&converted.primary)[0] {
        cs::MemberDecl::Destructor { name, body, .. } => {
            assert_eq!(name, "Resource");
            assert!(body.is_some());
        }
        other => panic!("expected destructor, got {other:?}"),
    }
}

#[test]
fn finalize_without_overrides_stays_a_method() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let finalize = vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Method {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Protected],
            is_function: false,
            ident: vb::Ident::new("Finalize"),
            type_params: None,
            parameters: vec![],
            as_clause: None,
            body: Some(vec![]),
        },
    };
    let converted = conv
        .convert_decl(&class_with(1, "Resource", vec![finalize]))
        .unwrap();
    assert!(matches!(
        type_members(&converted.primary)[0],
        cs::MemberDecl::Method { .. }
    ));
}

fn chained_ctor(receiver: vb::ExprKind) -> vb::Decl {
    let call = e(
        10,
        vb::ExprKind::Invocation {
            callee: Box::new(e(
                11,
                vb::ExprKind::MemberAccess {
                    base: Some(Box::new(e(12, receiver))),
                    name: vb::NameRef::identifier(nid(13), "New"),
                },
            )),
            arguments: vb::ArgumentList {
                arguments: vec![vb::Argument::Simple {
                    name: None,
                    expr: e(14, vb::ExprKind::Literal(vb::Literal::Int(1))),
                }],
            },
        },
    );
    vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Constructor {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            parameters: vec![],
            body: vec![
                vb::Statement {
                    id: nid(15),
                    kind: vb::StatementKind::Expression(call),
                },
                vb::Statement {
                    id: nid(16),
                    kind: vb::StatementKind::Return(None),
                },
            ],
        },
    }
}

#[test]
fn mybase_new_first_statement_becomes_a_base_initializer() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let converted = conv
        .convert_decl(&class_with(1, "Derived", vec![chained_ctor(vb::ExprKind::MyBase)]))
        .unwrap();
    match &type_members(&converted.primary)[0] {
        cs::MemberDecl::Constructor {
            name,
            initializer: Some(init),
            body,
            ..
        } => {
            assert_eq!(name, "Derived");
            assert_eq!(init.kind, cs::CtorInitializerKind::Base);
            assert_eq!(init.arguments.len(), 1);
            // The chained call left the body.
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected chained constructor, got {other:?}"),
    }
}

#[test]
fn me_new_first_statement_becomes_a_this_initializer() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let converted = conv
        .convert_decl(&class_with(1, "Thing", vec![chained_ctor(vb::ExprKind::Me)]))
        .unwrap();
    match &type_members(&converted.primary)[0] {
        cs::MemberDecl::Constructor {
            initializer: Some(init),
            ..
        } => assert_eq!(init.kind, cs::CtorInitializerKind::This),
        other => panic!("expected chained constructor, got {other:?}"),
    }
}

#[test]
fn default_property_named_items_renders_as_an_indexer() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let property = vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Property {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public, vb::Modifier::Default],
            ident: vb::Ident::new("items"),
            parameters: vec![parameter(3, "index", Some(predefined(4, vb::PredefinedTy::Integer)))],
            as_clause: Some(simple_as(5, vb::PredefinedTy::String)),
            initializer: None,
            accessors: None,
        },
    };
    let converted = conv
        .convert_decl(&class_with(1, "Collection", vec![property]))
        .unwrap();
    match &type_members(&converted.primary)[0] {
        cs::MemberDecl::Indexer { ty, parameters, .. } => {
            assert_eq!(ty.to_string(), "string");
            assert_eq!(parameters.len(), 1);
        }
        other => panic!("expected indexer, got {other:?}"),
    }
}

#[test]
fn default_property_with_another_name_stays_a_property() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let property = vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Property {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public, vb::Modifier::Default],
            ident: vb::Ident::new("Item"),
            parameters: vec![parameter(3, "index", Some(predefined(4, vb::PredefinedTy::Integer)))],
            as_clause: Some(simple_as(5, vb::PredefinedTy::String)),
            initializer: None,
            accessors: None,
        },
    };
    let converted = conv
        .convert_decl(&class_with(1, "Collection", vec![property]))
        .unwrap();
    assert!(matches!(
        type_members(&converted.primary)[0],
        cs::MemberDecl::Property { .. }
    ));
}

#[test]
fn readonly_auto_property_only_gets_a_getter() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Property {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public, vb::Modifier::ReadOnly],
            ident: vb::Ident::new("Count"),
            parameters: vec![],
            as_clause: Some(simple_as(2, vb::PredefinedTy::Integer)),
            initializer: None,
            accessors: None,
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Property {
            accessors,
            modifiers,
            ..
        } => {
            assert_eq!(accessors.len(), 1);
            assert_eq!(accessors[0].kind, cs::AccessorKind::Get);
            // ReadOnly shapes the accessor list, it is not a token.
            assert!(!modifiers.contains(&cs::Modifier::Readonly));
        }
        other => panic!("expected property, got {other:?}"),
    }
}

#[test]
fn writeonly_auto_property_still_gets_a_getter() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Property {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public, vb::Modifier::WriteOnly],
            ident: vb::Ident::new("Name"),
            parameters: vec![],
            as_clause: Some(simple_as(2, vb::PredefinedTy::String)),
            initializer: None,
            accessors: None,
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Property { accessors, .. } => {
            let kinds: Vec<cs::AccessorKind> = accessors.iter().map(|a| a.kind).collect();
            assert_eq!(kinds, vec![cs::AccessorKind::Get, cs::AccessorKind::Set]);
        }
        other => panic!("expected property, got {other:?}"),
    }
}

#[test]
fn as_new_property_gets_type_and_initializer_from_one_expression() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let creation = e(
        2,
        vb::ExprKind::ObjectCreation {
            ty: vb::TypeRef {
                id: nid(3),
                kind: vb::TypeKind::Name(vb::NameRef::identifier(nid(4), "Widget")),
            },
            arguments: None,
            initializer: None,
        },
    );
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Property {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Widget"),
            parameters: vec![],
            as_clause: Some(vb::TypedAs::New {
                object_creation: creation,
            }),
            initializer: None,
            accessors: None,
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Property {
            ty,
            initializer: Some(init),
            ..
        } => {
            assert_eq!(ty.to_string(), "Widget");
            assert!(matches!(init, cs::Expr::ObjectCreation { .. }));
        }
        other => panic!("expected property with initializer, got {other:?}"),
    }
}

#[test]
fn module_events_do_not_pick_up_static() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let event = vb::Decl {
        id: nid(2),
        kind: vb::DeclKind::Event {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Changed"),
            parameters: vec![],
            as_clause: Some(vb::AsClause {
                attributes: vec![],
                ty: vb::TypeRef {
                    id: nid(3),
                    kind: vb::TypeKind::Name(vb::NameRef::identifier(nid(4), "EventHandler")),
                },
            }),
            accessors: None,
        },
    };
    let module = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::TypeBlock {
            kind: vb::TypeBlockKind::Module,
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Notifications"),
            type_params: None,
            inherits: vec![],
            implements: vec![],
            members: vec![event],
        },
    };
    let converted = conv.convert_decl(&module).unwrap();
    match &type_members(&converted.primary)[0] {
        cs::MemberDecl::EventField { modifiers, .. } => {
            assert_eq!(modifiers, &[cs::Modifier::Public]);
        }
        other => panic!("expected field-like event, got {other:?}"),
    }
}

#[test]
fn enum_underlying_type_is_the_sole_base() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::EnumBlock {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Color"),
            underlying: Some(vb::AsClause {
                attributes: vec![],
                ty: predefined(2, vb::PredefinedTy::Byte),
            }),
            members: vec![vb::Decl {
                id: nid(3),
                kind: vb::DeclKind::EnumMember {
                    attributes: vec![],
                    ident: vb::Ident::new("Red"),
                    initializer: Some(e(4, vb::ExprKind::Literal(vb::Literal::Int(1)))),
                },
            }],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Enum { base, members, .. } => {
            assert_eq!(base.as_ref().unwrap().to_string(), "byte");
            assert_eq!(members.len(), 1);
            assert_eq!(members[0].name, "Red");
            assert!(members[0].initializer.is_some());
        }
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn out_marker_attribute_becomes_an_out_modifier() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let mut out_param = parameter(2, "result", Some(predefined(3, vb::PredefinedTy::Integer)));
    out_param.modifiers = vec![vb::Modifier::ByRef];
    out_param.attributes = vec![vb::AttributeList {
        attributes: vec![vb::Attribute {
            id: nid(4),
            target: None,
            name: vb::NameRef::identifier(nid(5), "Out"),
            arguments: None,
        }],
    }];
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Method {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            is_function: true,
            ident: vb::Ident::new("TryParse"),
            type_params: None,
            parameters: vec![out_param],
            as_clause: Some(vb::AsClause {
                attributes: vec![],
                ty: predefined(6, vb::PredefinedTy::Boolean),
            }),
            body: Some(vec![]),
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Method { parameters, .. } => {
            assert_eq!(parameters[0].modifiers, vec![cs::Modifier::Out]);
            assert!(parameters[0].attributes.is_empty());
        }
        other => panic!("expected method, got {other:?}"),
    }
}

#[test]
fn method_parameter_without_as_clause_defaults_to_object() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::Method {
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            is_function: false,
            ident: vb::Ident::new("Log"),
            type_params: None,
            parameters: vec![parameter(2, "message", None)],
            as_clause: None,
            body: Some(vec![]),
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Method {
            parameters,
            return_type,
            ..
        } => {
            assert_eq!(parameters[0].ty.as_ref().unwrap().to_string(), "object");
            assert_eq!(return_type.to_string(), "void");
        }
        other => panic!("expected method, got {other:?}"),
    }
}

#[test]
fn converted_members_serialize_for_tooling() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::TypeBlock {
            kind: vb::TypeBlockKind::Module,
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Utilities"),
            type_params: None,
            inherits: vec![],
            implements: vec![],
            members: vec![],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    let value = serde_json::to_value(&converted.primary).unwrap();
    assert_eq!(value["Type"]["kind"], "Class");
    assert_eq!(value["Type"]["name"], "Utilities");
}

#[test]
fn type_parameter_constraints_split_into_clauses() {
    let sem = TableContext::new();
    let mut conv = Converter::new(&sem);
    let decl = vb::Decl {
        id: nid(1),
        kind: vb::DeclKind::TypeBlock {
            kind: vb::TypeBlockKind::Class,
            attributes: vec![],
            modifiers: vec![vb::Modifier::Public],
            ident: vb::Ident::new("Repository"),
            type_params: Some(vb::TypeParameterList {
                parameters: vec![vb::TypeParameter {
                    ident: vb::Ident::new("T"),
                    variance: None,
                    constraints: vec![vb::Constraint::Class, vb::Constraint::New],
                }],
            }),
            inherits: vec![],
            implements: vec![],
            members: vec![],
        },
    };
    let converted = conv.convert_decl(&decl).unwrap();
    match &converted.primary {
        cs::MemberDecl::Type {
            type_params,
            constraints,
            ..
        } => {
            assert_eq!(type_params.len(), 1);
            assert_eq!(constraints.len(), 1);
            assert_eq!(constraints[0].param, "T");
            assert_eq!(
                constraints[0].constraints,
                vec![cs::Constraint::Class, cs::Constraint::Constructor]
            );
        }
        other => panic!("expected type declaration, got {other:?}"),
    }
}
