use orderdesk_core::TenantId;

/// Messages that belong to exactly one tenant.
///
/// Lets feeds offer a tenant-filtered subscription without knowing the payload type.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}
