use suivi::identity::{Permission, Role};
use suivi::permissions::{authorize, capabilities, define_permissions, permissions_for, Action, CrudPermissions, Resource};

fn perm(role: Role) -> Permission {
    Permission::new("user-1", role)
}

#[test]
fn every_role_is_bounded_by_admin() {
    for resource in Resource::ALL {
        let admin = capabilities(Role::Admin, resource);
        for role in Role::ALL {
            let caps = permissions_for(Some(&perm(role)), resource);
            assert!(caps.is_subset_of(&admin), "{role} on {resource} exceeds admin");
        }
    }
}

#[test]
fn admin_holds_every_capability() {
    for resource in Resource::ALL {
        assert_eq!(capabilities(Role::Admin, resource), CrudPermissions::all(), "admin on {resource}");
    }
}

#[test]
fn non_admin_roles_are_strictly_narrower_somewhere() {
    for role in Role::ALL.into_iter().filter(|r| !r.is_admin()) {
        let narrower = Resource::ALL.into_iter().any(|resource| {
            let caps = capabilities(role, resource);
            caps.is_subset_of(&capabilities(Role::Admin, resource)) && caps != capabilities(Role::Admin, resource)
        });
        assert!(narrower, "{role} matches admin on every resource");
    }
}

#[test]
fn string_and_typed_lookups_agree() {
    for role in Role::ALL {
        for resource in Resource::ALL {
            let p = perm(role);
            assert_eq!(define_permissions(Some(&p), resource.name()), permissions_for(Some(&p), resource));
        }
    }
}

#[test]
fn guest_and_unknown_resource_get_nothing() {
    for resource in Resource::ALL {
        assert_eq!(define_permissions(None, resource.name()), CrudPermissions::none());
        for action in Action::ALL {
            assert!(!authorize(None, resource, action).allow);
        }
    }
    for role in Role::ALL {
        assert!(define_permissions(Some(&perm(role)), "payroll").is_empty());
    }
}

#[test]
fn authorize_matches_capability_table() {
    for role in Role::ALL {
        for resource in Resource::ALL {
            let caps = permissions_for(Some(&perm(role)), resource);
            for action in Action::ALL {
                assert_eq!(authorize(Some(&perm(role)), resource, action).allow, caps.allows(action), "{role} {resource} {}", action.as_str());
            }
        }
    }
}

#[test]
fn lookups_are_stable_across_calls() {
    let p = perm(Role::Accompanist);
    let first = define_permissions(Some(&p), "reports");
    for _ in 0..100 {
        assert_eq!(define_permissions(Some(&p), "reports"), first);
    }
}

#[test]
fn selected_rows_of_the_matrix() {
    let sup = permissions_for(Some(&perm(Role::Supervisor)), Resource::Events);
    assert!(sup.can_delete && sup.can_edit && sup.can_add);

    let acc_classes = permissions_for(Some(&perm(Role::Accompanist)), Resource::Classes);
    assert!(acc_classes.is_empty());

    let member_msgs = permissions_for(Some(&perm(Role::Member)), Resource::Messages);
    assert!(member_msgs.can_add && !member_msgs.can_edit && !member_msgs.can_delete);

    let json = serde_json::to_value(permissions_for(Some(&perm(Role::Trainer)), Resource::Reports)).unwrap();
    assert_eq!(json["canEdit"], true);
    assert_eq!(json["canDelete"], false);
}
