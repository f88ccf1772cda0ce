use crate::permissions::Resource;
use crate::table::ColumnDef;

use super::spec::ResourceSpec;

fn col(key: &str, header: &str) -> ColumnDef {
    ColumnDef::new(key, header)
}

pub fn resource_spec(resource: Resource) -> ResourceSpec {
    match resource {
        Resource::Classes => ResourceSpec::new(resource, "Classes", "name")
            .column(col("name", "Name").sortable())
            .column(col("year", "Year").sortable())
            .column(col("trainer.name", "Trainer"))
            .detail("description", "Description")
            .also_search("trainer.name"),
        Resource::Members => ResourceSpec::new(resource, "Members", "name")
            .column(col("name", "Name").sortable())
            .column(col("email", "Email"))
            .column(col("team.name", "Team").sortable())
            .detail("phone", "Phone")
            .also_search("email"),
        Resource::Projects => ResourceSpec::new(resource, "Projects", "title")
            .column(col("title", "Title").sortable())
            .column(col("status", "Status").sortable())
            .column(col("member.name", "Member"))
            .detail("description", "Description")
            .also_search("member.name"),
        Resource::Teams => ResourceSpec::new(resource, "Teams", "name")
            .column(col("name", "Name").sortable())
            .column(col("members.name", "Members"))
            .also_search("members.name"),
        Resource::Accompaniments => ResourceSpec::new(resource, "Accompaniments", "name")
            .column(col("name", "Name").sortable())
            .column(col("users.name", "People"))
            .column(col("status", "Status").sortable())
            .column(col("start_date", "Start").sortable())
            .detail("goals", "Goals")
            .also_search("users.name"),
        Resource::Reports => ResourceSpec::new(resource, "Reports", "title")
            .column(col("title", "Title").sortable())
            .column(col("accompaniment.name", "Accompaniment"))
            .column(col("author.name", "Author"))
            .column(col("date", "Date").sortable())
            .detail("content", "Content")
            .also_search("accompaniment.name")
            .also_search("author.name"),
        Resource::Conflicts => ResourceSpec::new(resource, "Conflicts", "subject")
            .column(col("subject", "Subject").sortable())
            .column(col("parties.name", "Parties"))
            .column(col("status", "Status").sortable())
            .detail("resolution", "Resolution")
            .also_search("parties.name"),
        Resource::Events => ResourceSpec::new(resource, "Events", "title")
            .column(col("title", "Title").sortable())
            .column(col("date", "Date").sortable())
            .column(col("location", "Location"))
            .detail("description", "Description")
            .also_search("location"),
        Resource::Messages => ResourceSpec::new(resource, "Messages", "subject")
            .column(col("subject", "Subject"))
            .column(col("sender.name", "From"))
            .column(col("sent_at", "Sent").sortable())
            .detail("body", "Message")
            .also_search("sender.name")
            .also_search("body"),
    }
}

pub fn all_specs() -> Vec<ResourceSpec> {
    Resource::ALL.into_iter().map(resource_spec).collect()
}
